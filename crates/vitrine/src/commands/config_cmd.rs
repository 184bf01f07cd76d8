//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_file(global);
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::resolve(global)?;
            let rendered = match config::output_format(global, &cfg) {
                OutputFormat::Table | OutputFormat::Plain => {
                    let mut text = toml::to_string_pretty(&cfg)
                        .map_err(|e| CliError::Render(e.to_string()))?;
                    if cfg.storage_path.is_none() {
                        text.push_str(&format!(
                            "# storage_path = \"{}\"\n",
                            cfg.storage_path().display()
                        ));
                    }
                    text.trim_end().to_owned()
                }
                format => output::render_single(format, &cfg, |_| String::new(), |_| String::new())?,
            };
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        ConfigCommand::Init => {
            if path.exists()
                && !util::confirm(
                    &format!("Overwrite {}?", path.display()),
                    "config init",
                    global.yes,
                )?
            {
                return Ok(());
            }
            let cfg = config::resolve(global)?;
            vitrine_config::save_config_to(&cfg, &path)?;
            if !global.quiet {
                eprintln!("Config written to {}", path.display());
            }
            Ok(())
        }
    }
}
