//! Error types for the view-state containers.

use std::path::PathBuf;

use thiserror::Error;

/// A failed call into a [`StudySource`](crate::StudySource).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {message}")]
pub struct SourceError {
    /// Source operation that failed, e.g. `"categories"`.
    pub operation: &'static str,
    pub message: String,
}

impl SourceError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Errors returned by container operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The study source could not serve the request.
    #[error("source error: {0}")]
    SourceError(#[from] SourceError),

    /// The source has no question with this id.
    #[error("question {0} not found")]
    NotFound(i64),

    /// Snapshot JSON could not be written or read.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A storage key is unusable.
    #[error("storage error: {0}")]
    StorageError(String),

    /// File-backed storage failed.
    #[error("I/O error on {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
