//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and exit codes.

use miette::Diagnostic;
use thiserror::Error;

use vitrine_config::ConfigError;
use vitrine_core::{ApiError, CoreError};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(
        code(vitrine::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Set the URL with --api-url or VITRINE_API_URL, or pass --fallback\n\
             to browse the built-in sample catalog."
        )
    )]
    ConnectionFailed { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(vitrine::auth_failed), help("Run: vitrine login"))]
    AuthFailed { message: String },

    #[error("{message}")]
    #[diagnostic(code(vitrine::permission_denied))]
    PermissionDenied { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(vitrine::not_found), help("List entries with: vitrine {list_command}"))]
    NotFound { message: String, list_command: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(vitrine::invalid_input), help("{details}"))]
    InvalidInput { message: String, details: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(vitrine::validation))]
    Validation { field: String, reason: String },

    // ── Backend ──────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(vitrine::api_error))]
    Api { message: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(vitrine::config),
        help("Inspect the resolved settings with: vitrine config show")
    )]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(vitrine::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(vitrine::json), help("Check the JSON body and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Could not render output: {0}")]
    #[diagnostic(code(vitrine::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::InvalidInput { .. }
            | Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the list command to suggest for a not-found error.
    pub fn with_list_command(self, command: &str) -> Self {
        match self {
            Self::NotFound { message, .. } => Self::NotFound {
                message,
                list_command: command.into(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { message, fields } => {
                let details = if fields.is_empty() {
                    "The backend rejected the request.".to_owned()
                } else {
                    fields
                        .iter()
                        .map(|(field, reason)| format!("{field}: {reason}"))
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                CliError::InvalidInput { message, details }
            }
            CoreError::Authentication { message } => CliError::AuthFailed { message },
            CoreError::Permission { message } => CliError::PermissionDenied { message },
            CoreError::NotFound { message } => CliError::NotFound {
                message,
                list_command: "products list".into(),
            },
            CoreError::Connection { message } => CliError::ConnectionFailed { message },
            CoreError::Server { message } | CoreError::Unknown { message, .. } => {
                CliError::Api { message }
            }
        }
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        CoreError::from(err).into()
    }
}
