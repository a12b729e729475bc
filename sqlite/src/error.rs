//! Error types for SQLite deck operations.
//!
//! Provides a unified error type covering connection lifecycle, statement
//! execution, seed import, row conversion, and schema migration failures.

use thiserror::Error;

/// Lifecycle failures of the database [`Session`](crate::Session).
///
/// `AlreadyOpen` and `NotOpen` are recoverable: [`Session::open`] and
/// [`Session::close`] treat them as no-ops, and the gateway answers
/// `NotOpen` with a single reopen.
///
/// [`Session::open`]: crate::Session::open
/// [`Session::close`]: crate::Session::close
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// A handle for this database already exists.
    #[error("database '{0}' is already open")]
    AlreadyOpen(String),

    /// No handle exists for this database.
    #[error("database '{0}' is not open")]
    NotOpen(String),

    /// SQLite refused to open or configure the database file.
    #[error("failed to open database '{name}': {source}")]
    Open {
        name: String,
        #[source]
        source: rusqlite::Error,
    },

    /// SQLite refused to close the handle; the handle is kept.
    #[error("failed to close database '{name}': {source}")]
    Close {
        name: String,
        #[source]
        source: rusqlite::Error,
    },
}

/// Errors that can occur during SQLite deck operations.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// Session open/close failure.
    #[error("connection error: {0}")]
    ConnectionError(#[from] ConnectionError),

    /// Malformed SQL or constraint violation.
    #[error("statement error: {0}")]
    StatementError(#[from] rusqlite::Error),

    /// Seed data could not be imported.
    #[error("import error: {0}")]
    ImportError(String),

    /// A stored value could not be mapped to its Rust type.
    #[error("conversion error: {0}")]
    ConversionError(String),

    /// Schema lifecycle operation failure.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Error loading seed data.
    #[error("loader error: {0}")]
    LoaderError(#[from] interview_deck_db::DatabaseError),
}

impl SqliteError {
    /// Returns `true` if the session was closed when the statement ran.
    pub fn is_not_open(&self) -> bool {
        matches!(self, SqliteError::ConnectionError(ConnectionError::NotOpen(_)))
    }
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
