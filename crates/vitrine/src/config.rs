//! CLI flag overrides on top of `vitrine-config`.
//!
//! Core never sees these types: it receives a resolved `SessionConfig`.

use std::path::PathBuf;

use clap::ValueEnum;
use vitrine_config::Config;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// The config file in effect: `--config` / `VITRINE_CONFIG`, else the
/// platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(vitrine_config::config_path)
}

/// Load file + env, then apply flags (flag > env > file > default).
pub fn resolve(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = vitrine_config::load_config_from(&config_file(global))?;

    if let Some(ref url) = global.api_url {
        cfg.api_url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout_secs = timeout;
    }
    if global.fallback {
        cfg.fallback_enabled = true;
    }
    if let Some(format) = global.output {
        cfg.output = format_name(format).into();
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Output format from flags, else from config.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global
        .output
        .or_else(|| OutputFormat::from_str(&cfg.output, true).ok())
        .unwrap_or(OutputFormat::Table)
}

fn format_name(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Table => "table",
        OutputFormat::Json => "json",
        OutputFormat::Yaml => "yaml",
        OutputFormat::Plain => "plain",
    }
}
