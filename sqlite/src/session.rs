//! Process-wide database session.
//!
//! A [`Session`] owns at most one open SQLite handle for a named database.
//! Opening is idempotent, closing an already closed session is a no-op, and
//! concurrent callers never race to create a second handle: the handle slot
//! sits behind a mutex, so a caller that arrives while an open is in flight
//! waits for it and then sees the handle it produced.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use interview_deck_sqlite::{Session, SessionConfig};
//!
//! let session = Arc::new(Session::new(SessionConfig::new("interview_deck", "deck.db")));
//! session.open().unwrap();
//! session.open().unwrap(); // reuses the handle
//! assert!(session.is_open());
//! session.close().unwrap();
//! session.close().unwrap(); // no-op
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use interview_deck_db::DatabaseConfig;
use rusqlite::Connection;
use tracing::debug;

use crate::error::{ConnectionError, Result};

/// Pragmas applied to every freshly opened handle.
const OPEN_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

/// Name and file of the database a [`Session`] manages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub name: String,
    pub path: PathBuf,
}

impl SessionConfig {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl From<&DatabaseConfig> for SessionConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self::new(config.name.clone(), config.path.clone())
    }
}

/// The single shared handle to the deck database.
///
/// Share it as `Arc<Session>`; every method takes `&self`. Statements run
/// through [`with_connection`](Self::with_connection), which holds the handle
/// lock for the duration of the closure, so statements on one session are
/// serialized.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    handle: Mutex<Option<Connection>>,
    opens: AtomicU64,
}

impl Session {
    /// Creates a closed session. Nothing touches the file until
    /// [`open`](Self::open).
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            handle: Mutex::new(None),
            opens: AtomicU64::new(0),
        }
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the database name used in logs and errors.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the database file path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Number of handles this session has created over its lifetime.
    pub fn open_count(&self) -> u64 {
        self.opens.load(Ordering::Relaxed)
    }

    // A panic inside a statement closure leaves the slot itself consistent.
    fn slot(&self) -> MutexGuard<'_, Option<Connection>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens the database, failing if a handle already exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::AlreadyOpen`] if the session is open, or
    /// [`ConnectionError::Open`] if SQLite cannot open or configure the file.
    pub fn try_open(&self) -> std::result::Result<(), ConnectionError> {
        let mut slot = self.slot();
        if slot.is_some() {
            return Err(ConnectionError::AlreadyOpen(self.config.name.clone()));
        }

        let conn = Connection::open(&self.config.path).map_err(|source| ConnectionError::Open {
            name: self.config.name.clone(),
            source,
        })?;
        conn.execute_batch(OPEN_PRAGMAS)
            .map_err(|source| ConnectionError::Open {
                name: self.config.name.clone(),
                source,
            })?;

        *slot = Some(conn);
        self.opens.fetch_add(1, Ordering::Relaxed);
        debug!(
            database = %self.config.name,
            path = %self.config.path.display(),
            "opened database"
        );
        Ok(())
    }

    /// Opens the database, reusing the existing handle if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Open`] if a new handle cannot be created.
    pub fn open(&self) -> std::result::Result<(), ConnectionError> {
        match self.try_open() {
            Err(ConnectionError::AlreadyOpen(_)) => {
                debug!(database = %self.config.name, "database already open, reusing handle");
                Ok(())
            }
            other => other,
        }
    }

    /// Closes the database, failing if no handle exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::NotOpen`] if the session is closed, or
    /// [`ConnectionError::Close`] if SQLite refuses to close the handle. In
    /// the latter case the handle stays in place.
    pub fn try_close(&self) -> std::result::Result<(), ConnectionError> {
        let mut slot = self.slot();
        let Some(conn) = slot.take() else {
            return Err(ConnectionError::NotOpen(self.config.name.clone()));
        };

        if let Err((conn, source)) = conn.close() {
            *slot = Some(conn);
            return Err(ConnectionError::Close {
                name: self.config.name.clone(),
                source,
            });
        }
        debug!(database = %self.config.name, "closed database");
        Ok(())
    }

    /// Closes the database. Closing a closed session does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Close`] if SQLite refuses to close the handle.
    pub fn close(&self) -> std::result::Result<(), ConnectionError> {
        match self.try_close() {
            Err(ConnectionError::NotOpen(_)) => Ok(()),
            other => other,
        }
    }

    /// Returns `true` if a handle currently exists.
    pub fn is_open(&self) -> bool {
        self.slot().is_some()
    }

    /// Runs `f` against the open handle.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::NotOpen`] without calling `f` if the session
    /// is closed; otherwise whatever `f` returns.
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let slot = self.slot();
        match slot.as_ref() {
            Some(conn) => f(conn),
            None => Err(ConnectionError::NotOpen(self.config.name.clone()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn temp_session() -> (tempfile::TempDir, Session) {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(SessionConfig::new("test", dir.path().join("test.db")));
        (dir, session)
    }

    #[test]
    fn test_new_session_is_closed() {
        let (_dir, session) = temp_session();
        assert!(!session.is_open());
        assert_eq!(session.open_count(), 0);
    }

    #[test]
    fn test_open_is_idempotent() {
        let (_dir, session) = temp_session();
        session.open().unwrap();
        session.open().unwrap();
        assert!(session.is_open());
        assert_eq!(session.open_count(), 1);
    }

    #[test]
    fn test_try_open_reports_already_open() {
        let (_dir, session) = temp_session();
        session.try_open().unwrap();
        assert!(matches!(
            session.try_open(),
            Err(ConnectionError::AlreadyOpen(name)) if name == "test"
        ));
    }

    #[test]
    fn test_close_when_closed_is_noop() {
        let (_dir, session) = temp_session();
        session.close().unwrap();
        assert!(matches!(session.try_close(), Err(ConnectionError::NotOpen(_))));
    }

    #[test]
    fn test_close_then_reopen() {
        let (_dir, session) = temp_session();
        session.open().unwrap();
        session.close().unwrap();
        assert!(!session.is_open());
        session.open().unwrap();
        assert!(session.is_open());
        assert_eq!(session.open_count(), 2);
    }

    #[test]
    fn test_with_connection_requires_open() {
        let (_dir, session) = temp_session();
        let err = session.with_connection(|_| Ok(())).unwrap_err();
        assert!(err.is_not_open());

        session.open().unwrap();
        let value: i64 = session
            .with_connection(|conn| Ok(conn.query_row("SELECT 41 + 1", [], |row| row.get(0))?))
            .unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_foreign_keys_enabled_on_open() {
        let (_dir, session) = temp_session();
        session.open().unwrap();
        let enabled: i64 = session
            .with_connection(|conn| Ok(conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_open_unreachable_path_fails() {
        let session = Session::new(SessionConfig::new("bad", "/nonexistent/dir/deck.db"));
        assert!(matches!(session.open(), Err(ConnectionError::Open { .. })));
        assert!(!session.is_open());
    }

    #[test]
    fn test_concurrent_open_creates_one_handle() {
        let (_dir, session) = temp_session();
        let session = Arc::new(session);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let session = Arc::clone(&session);
                thread::spawn(move || session.open())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert!(session.is_open());
        assert_eq!(session.open_count(), 1);
    }

    #[test]
    fn test_from_database_config() {
        let config = DatabaseConfig::default();
        let session_config = SessionConfig::from(&config);
        assert_eq!(session_config.name, "interview_deck");
        assert_eq!(session_config.path, PathBuf::from("interview_deck.db"));
    }
}
