//! Error taxonomy for directory operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, transforming or persisting the proxy document.
///
/// Every variant except `Io` and `Serialize` is detected before anything is
/// written, so a failed mutation leaves the file untouched.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Client id missing or blank after trimming.
    #[error("{0}")]
    InvalidInput(String),

    /// The id already exists in at least one client list.
    #[error("User ID '{0}' already exists")]
    Conflict(String),

    /// The id is not present in any client list.
    #[error("User ID '{0}' not found")]
    NotFound(String),

    /// The document is not JSON or lacks an `inbounds` array.
    #[error("Malformed proxy config: {0}")]
    MalformedConfig(String),

    /// The proxy document does not exist at the configured path.
    #[error("Proxy config not found at {}", .0.display())]
    ConfigMissing(PathBuf),

    /// Reading or replacing the file failed.
    #[error("Proxy config IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document could not be encoded back to JSON.
    #[error("Failed to encode proxy config: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The mutation worker is gone (shutdown in progress).
    #[error("Mutation queue is closed")]
    QueueClosed,
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
