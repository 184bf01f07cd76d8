//! Configuration for vitrine front ends.
//!
//! Layers serialized defaults, the TOML file in the platform config
//! directory and `VITRINE_*` environment variables, then resolves the
//! result into a `vitrine_core::SessionConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use vitrine_core::SessionConfig;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── Config ──────────────────────────────────────────────────────────

/// Environment prefix for overrides, e.g. `VITRINE_API_URL`.
pub const ENV_PREFIX: &str = "VITRINE_";

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Backend base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Where the session file (token, profile, theme) lives.
    /// Defaults to `session.json` in the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,

    /// Serve built-in sample data when the backend is unreachable.
    #[serde(default)]
    pub fallback_enabled: bool,

    #[serde(default = "default_notification_ttl")]
    pub notification_ttl_ms: u64,

    /// Default CLI output format.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout(),
            storage_path: None,
            fallback_enabled: false,
            notification_ttl_ms: default_notification_ttl(),
            output: default_output(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:5000".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_notification_ttl() -> u64 {
    3000
}
fn default_output() -> String {
    "table".into()
}

impl Config {
    /// Parse and check `api_url`.
    pub fn api_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(self.api_url.trim())
            .map_err(|e| ConfigError::invalid("api_url", format!("{e}: {}", self.api_url)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::invalid(
                "api_url",
                format!("expected an http or https URL, got scheme '{other}'"),
            )),
        }
    }

    /// Storage file path, falling back to the platform data directory.
    pub fn storage_path(&self) -> PathBuf {
        self.storage_path.clone().unwrap_or_else(default_storage_path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api_url()?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid("timeout_secs", "must be at least 1"));
        }
        if self.notification_ttl_ms == 0 {
            return Err(ConfigError::invalid("notification_ttl_ms", "must be at least 1"));
        }
        match self.output.as_str() {
            "table" | "json" | "yaml" | "plain" => Ok(()),
            other => Err(ConfigError::invalid(
                "output",
                format!("expected one of table, json, yaml, plain; got '{other}'"),
            )),
        }
    }

    /// Resolve into the settings the core session is built from.
    pub fn to_session_config(&self) -> Result<SessionConfig, ConfigError> {
        self.validate()?;
        let mut session = SessionConfig::new(self.api_url()?);
        session.timeout = Duration::from_secs(self.timeout_secs);
        session.fallback_enabled = self.fallback_enabled;
        session.notification_ttl = Duration::from_millis(self.notification_ttl_ms);
        Ok(session)
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "vitrine", "vitrine")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn default_storage_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("session.json"),
        |dirs| dirs.data_dir().join("session.json"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("vitrine");
    p
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load from the canonical config path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load with `path` as the TOML layer. A missing file is skipped.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()?;
    config.validate()?;
    Ok(config)
}

// ── Saving ──────────────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_resolve_to_a_local_session() {
        let cfg = Config::default();
        let session = cfg.to_session_config().unwrap();
        assert_eq!(session.api_url.as_str(), "http://localhost:5000/");
        assert_eq!(session.timeout, Duration::from_secs(10));
        assert_eq!(session.notification_ttl, Duration::from_millis(3000));
        assert!(!session.fallback_enabled);
        assert!(cfg.storage_path().ends_with("session.json"));
    }

    #[test]
    fn file_then_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    api_url = "http://api.internal:8080"
                    timeout_secs = 30
                    fallback_enabled = true
                "#,
            )?;
            jail.set_env("VITRINE_TIMEOUT_SECS", "5");
            jail.set_env("VITRINE_STORAGE_PATH", "/tmp/vitrine-session.json");

            let cfg = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg.api_url, "http://api.internal:8080");
            assert_eq!(cfg.timeout_secs, 5);
            assert!(cfg.fallback_enabled);
            assert_eq!(cfg.notification_ttl_ms, 3000);
            assert_eq!(cfg.storage_path(), PathBuf::from("/tmp/vitrine-session.json"));
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_| {
            let cfg = load_config_from(Path::new("absent.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg, Config::default());
            Ok(())
        });
    }

    #[test]
    fn rejects_bad_values() {
        let cfg = Config {
            api_url: "ftp://example.com".into(),
            ..Config::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "api_url"
        ));

        let cfg = Config {
            timeout_secs: 0,
            ..Config::default()
        };
        assert!(matches!(
            cfg.to_session_config(),
            Err(ConfigError::Validation { ref field, .. }) if field == "timeout_secs"
        ));

        let cfg = Config {
            output: "xml".into(),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn save_writes_loadable_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            api_url: "https://vitrine.example.com".into(),
            fallback_enabled: true,
            ..Config::default()
        };

        save_config_to(&cfg, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("fallback_enabled = true"));
        assert!(!written.contains("storage_path"));

        let parsed: Config = toml::from_str(&written).unwrap();
        assert_eq!(parsed, cfg);
    }
}
