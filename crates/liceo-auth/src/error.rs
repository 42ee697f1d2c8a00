//! Error types for the auth crate.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur in the token lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Network/HTTP error.
    #[error("network error: {0}")]
    Network(String),

    /// The server rejected the request. The message is the server's own,
    /// extracted from the response body.
    #[error("{message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// An operation needed stored credentials and found none.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Token persistence failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Network(e.to_string())
    }
}
