use thiserror::Error;

/// Classification of every failure the transport can produce.
///
/// The first seven kinds mirror how the backend answers (or fails to
/// answer). Plumbing failures (bad URL, unreadable body, storage) are
/// reported through their own [`Error`] variants but classify as
/// [`ErrorKind::Unknown`] for user-facing messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Permission,
    NotFound,
    Server,
    Connection,
    Unknown,
}

impl ErrorKind {
    /// Fixed human-readable message used when the server did not send one.
    pub fn default_message(self) -> &'static str {
        match self {
            Self::Validation => "The submitted data is invalid.",
            Self::Authentication => "Your session has expired. Please log in again.",
            Self::Permission => "You do not have permission for this action.",
            Self::NotFound => "Resource not found.",
            Self::Server => "Server error. Please try again later.",
            Self::Connection => "Connection error. Check your network.",
            Self::Unknown => "Something went wrong. Please try again.",
        }
    }
}

/// Top-level error type for the `vitrine-api` crate.
///
/// Covers every failure mode of the transport: HTTP status classes,
/// missing responses, response decoding and credential storage.
/// `vitrine-core` maps these into store-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Backend answered with an error status ───────────────────────
    /// 400 / 422: the request payload was rejected.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// 401: missing, expired or revoked token (or bad login credentials).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// 403: authenticated but not allowed.
    #[error("Permission denied: {message}")]
    Permission { message: String },

    /// 404: unknown resource or id.
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// 5xx.
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-success status.
    #[error("Unexpected response (HTTP {status}): {message}")]
    Unknown { status: u16, message: String },

    // ── No response ─────────────────────────────────────────────────
    /// Connection refused, DNS failure, timeout: nothing came back.
    #[error("Connection failed: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    // ── Plumbing ────────────────────────────────────────────────────
    /// Building the HTTP client failed.
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Durable key/value storage failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Which taxonomy bucket this error falls into.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Permission { .. } => ErrorKind::Permission,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Server { .. } => ErrorKind::Server,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Unknown { .. }
            | Self::Client(_)
            | Self::InvalidUrl(_)
            | Self::Deserialization { .. }
            | Self::Storage(_) => ErrorKind::Unknown,
        }
    }

    /// The message suitable for showing to a user: the server's own text
    /// for status errors, the fixed per-kind default otherwise.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation { message }
            | Self::Authentication { message }
            | Self::Permission { message }
            | Self::NotFound { message }
            | Self::Server { message, .. }
            | Self::Unknown { message, .. }
            | Self::Connection { message, .. } => message,
            Self::Client(_)
            | Self::InvalidUrl(_)
            | Self::Deserialization { .. }
            | Self::Storage(_) => self.kind().default_message(),
        }
    }

    /// Build the error for an HTTP status, preferring the server's message.
    pub fn from_status(status: u16, server_message: Option<String>) -> Self {
        let kind = match status {
            400 | 422 => ErrorKind::Validation,
            401 => ErrorKind::Authentication,
            403 => ErrorKind::Permission,
            404 => ErrorKind::NotFound,
            s if s >= 500 => ErrorKind::Server,
            _ => ErrorKind::Unknown,
        };
        let message = server_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| kind.default_message().to_owned());

        match kind {
            ErrorKind::Validation => Self::Validation { message },
            ErrorKind::Authentication => Self::Authentication { message },
            ErrorKind::Permission => Self::Permission { message },
            ErrorKind::NotFound => Self::NotFound { message },
            ErrorKind::Server => Self::Server { status, message },
            ErrorKind::Connection | ErrorKind::Unknown => Self::Unknown { status, message },
        }
    }

    /// A request that never produced a response.
    pub fn connection(source: reqwest::Error) -> Self {
        Self::Connection {
            message: ErrorKind::Connection.default_message().to_owned(),
            source: Some(source),
        }
    }

    /// Returns `true` if this error means the session is no longer valid.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if the backend could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert_eq!(Error::from_status(400, None).kind(), ErrorKind::Validation);
        assert_eq!(Error::from_status(422, None).kind(), ErrorKind::Validation);
        assert_eq!(
            Error::from_status(401, None).kind(),
            ErrorKind::Authentication
        );
        assert_eq!(Error::from_status(403, None).kind(), ErrorKind::Permission);
        assert_eq!(Error::from_status(404, None).kind(), ErrorKind::NotFound);
        assert_eq!(Error::from_status(500, None).kind(), ErrorKind::Server);
        assert_eq!(Error::from_status(503, None).kind(), ErrorKind::Server);
        assert_eq!(Error::from_status(409, None).kind(), ErrorKind::Unknown);
        assert_eq!(Error::from_status(302, None).kind(), ErrorKind::Unknown);
    }

    #[test]
    fn server_message_wins_over_default() {
        let err = Error::from_status(422, Some("Email already registered".into()));
        assert_eq!(err.user_message(), "Email already registered");
    }

    #[test]
    fn blank_server_message_falls_back_to_default() {
        let err = Error::from_status(403, Some("   ".into()));
        assert_eq!(
            err.user_message(),
            ErrorKind::Permission.default_message()
        );
    }

    #[test]
    fn plumbing_errors_use_unknown_default() {
        let err = Error::Storage("disk full".into());
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.user_message(), ErrorKind::Unknown.default_message());
    }
}
