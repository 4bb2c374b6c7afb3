//! Error types for notely.

use thiserror::Error;

use crate::remote::{Collection, RecordId};

/// Result type for notely operations.
pub type Result<T> = std::result::Result<T, NotelyError>;

/// Errors surfaced by the stores, the remote clients and configuration.
///
/// Validation failures (blank titles, out-of-range reorder indices) are not
/// errors; the stores reject them with `Ok(None)` / `Ok(false)`.
#[derive(Debug, Error)]
pub enum NotelyError {
    /// Transport failure (connection refused, timeout, TLS)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response from the backend
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected record shape
    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Record does not exist locally or remotely
    #[error("{collection} record {id} not found")]
    NotFound { collection: Collection, id: RecordId },

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config file I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NotelyError {
    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Api { status: 404, .. })
    }
}
