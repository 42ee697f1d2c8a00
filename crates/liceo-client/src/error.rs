//! Client error types.

use thiserror::Error;

/// Fixed message for a session that can no longer be refreshed.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned an error response. The message is the server's
    /// own, extracted from the body.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// The session could not be refreshed. The local tokens have already
    /// been cleared when this is returned.
    #[error("Session expired. Please login again.")]
    SessionExpired,

    /// Auth operation failed (login rejection, refresh round-trip, token
    /// persistence). Server messages pass through verbatim.
    #[error(transparent)]
    Auth(#[from] liceo_auth::AuthError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this is the fixed session-expired error.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Error::SessionExpired)
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this is a forbidden error, e.g. a profile fetch for an
    /// account not linked to a student record.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Error::Api { status: 403, .. })
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
