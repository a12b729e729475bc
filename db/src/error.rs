//! Error types for seed loading and configuration.
//!
//! Provides a unified error type covering I/O, JSON and YAML parsing, and
//! missing seed sources.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading seed data or configuration.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A seed directory lacks one of the expected files.
    #[error("missing seed file: {}", .0.display())]
    MissingSeedFile(PathBuf),

    /// All configured loader sources failed.
    #[error("no seed sources available")]
    NoSourcesAvailable,
}

/// Convenience alias for results with [`DatabaseError`].
pub type Result<T> = std::result::Result<T, DatabaseError>;
