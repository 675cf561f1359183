//! Error types for the core library.

use thiserror::Error;

use crate::mail::MailError;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The mail store could not be reached.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Message content could not be retrieved.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<MailError> for Error {
    fn from(err: MailError) -> Self {
        match err {
            MailError::Connection(msg) => Self::Connection(msg),
            MailError::Fetch(msg) => Self::Fetch(msg),
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
