//! Error types for itinerary extraction.

use std::time::Duration;

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors raised by an extraction engine for a single input document.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Input exceeds the engine's size limit.
    #[error("Input too large: {size} bytes (limit {limit})")]
    InputTooLarge {
        /// Size of the rejected input.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Input or engine output is not valid itinerary JSON.
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The engine program could not be started.
    #[error("Extraction engine unavailable: {0}")]
    Unavailable(String),

    /// The engine did not finish in time.
    #[error("Extraction timed out after {0:?}")]
    Timeout(Duration),

    /// The engine exited unsuccessfully.
    #[error("Extraction engine failed with status {status}: {stderr}")]
    Engine {
        /// Exit status description.
        status: String,
        /// Captured standard error output.
        stderr: String,
    },

    /// I/O error while talking to the engine.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
