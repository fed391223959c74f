//! Topology source error types.

use std::path::PathBuf;

/// Errors from the Overpass client and the topology disk cache.
#[derive(Debug, thiserror::Error)]
pub enum OverpassError {
    /// Request could not be sent or the response body not read
    #[error("network error: {0}")]
    Network(String),

    /// Overpass answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body is not valid Overpass JSON
    #[error("parse error: {0}")]
    Parse(String),

    /// Reading or writing the snapshot file failed
    #[error("snapshot {}: {source}", .path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot could not be encoded
    #[error("snapshot encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

impl OverpassError {
    /// Whether the request may succeed when sent again.
    ///
    /// Network failures, `429 Too Many Requests` and server errors are
    /// transient; everything else is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            OverpassError::Network(_) => true,
            OverpassError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            OverpassError::Parse(_)
            | OverpassError::Snapshot { .. }
            | OverpassError::Encode(_) => false,
        }
    }
}
