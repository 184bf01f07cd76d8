// ── Core error types ──
//
// Errors surfaced by stores and the session. Transport failures keep
// their taxonomy bucket and the user-facing message chosen by the API
// layer; the raw HTTP detail stays in `vitrine-api`.

use std::collections::BTreeMap;

use thiserror::Error;
use vitrine_api::ErrorKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Rejected input: by local validation (with per-field messages) or
    /// by the backend (400/422, no field detail).
    #[error("{message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, String>,
    },

    #[error("{message}")]
    Authentication { message: String },

    #[error("{message}")]
    Permission { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Server { message: String },

    #[error("{message}")]
    Connection { message: String },

    /// Anything else, including plumbing failures. `detail` keeps the
    /// underlying cause for logs.
    #[error("{message}")]
    Unknown { message: String, detail: Option<String> },
}

impl CoreError {
    /// Local validation failure from a map of field → message.
    pub fn invalid(fields: BTreeMap<String, String>) -> Self {
        let message = fields
            .values()
            .cloned()
            .collect::<Vec<_>>()
            .join("; ");
        Self::Validation { message, fields }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Permission { .. } => ErrorKind::Permission,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Server { .. } => ErrorKind::Server,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// The message shown to the user through the notifier.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation { message, .. }
            | Self::Authentication { message }
            | Self::Permission { message }
            | Self::NotFound { message }
            | Self::Server { message }
            | Self::Connection { message }
            | Self::Unknown { message, .. } => message,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<vitrine_api::Error> for CoreError {
    fn from(err: vitrine_api::Error) -> Self {
        let message = err.user_message().to_owned();
        match err.kind() {
            ErrorKind::Validation => CoreError::Validation {
                message,
                fields: BTreeMap::new(),
            },
            ErrorKind::Authentication => CoreError::Authentication { message },
            ErrorKind::Permission => CoreError::Permission { message },
            ErrorKind::NotFound => CoreError::NotFound { message },
            ErrorKind::Server => CoreError::Server { message },
            ErrorKind::Connection => CoreError::Connection { message },
            ErrorKind::Unknown => CoreError::Unknown {
                message,
                detail: Some(err.to_string()),
            },
        }
    }
}
