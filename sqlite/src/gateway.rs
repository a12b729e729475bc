//! Statement execution over a shared [`Session`].
//!
//! [`Gateway`] runs parameterized SQL against the session handle. If the
//! session turns out to be closed, it reopens it once and retries; any
//! second failure is returned to the caller.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use interview_deck_sqlite::{Gateway, Session, SessionConfig};
//! use rusqlite::params;
//!
//! let session = Arc::new(Session::new(SessionConfig::new("interview_deck", "deck.db")));
//! let gateway = Gateway::new(session);
//!
//! let titles = gateway
//!     .query(
//!         "SELECT title FROM question_map WHERE category_id = ?1",
//!         params![1],
//!         |row| row.get::<_, String>(0),
//!     )
//!     .unwrap();
//! ```

use std::sync::Arc;

use rusqlite::{Connection, OptionalExtension, Params, Row};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::session::Session;

/// How many times a statement is retried after reopening a closed session.
const MAX_REOPEN_ATTEMPTS: u32 = 1;

/// Outcome of a data-modifying statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExecuteSummary {
    /// Rows changed by the statement.
    pub rows_affected: usize,
    /// Rowid of the most recent successful insert on the handle.
    pub last_insert_id: i64,
}

/// Executes statements against a shared [`Session`].
///
/// Parameters are always bound, never spliced into SQL text. `P` must be
/// `Copy` because a retried statement binds them a second time; the
/// [`rusqlite::params!`] macro produces such a value.
#[derive(Debug, Clone)]
pub struct Gateway {
    session: Arc<Session>,
}

impl Gateway {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Returns the session statements run against.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Runs a data-modifying statement.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::StatementError`](crate::SqliteError::StatementError)
    /// for malformed SQL or constraint violations, or a connection error if
    /// the session cannot be reopened.
    pub fn execute<P>(&self, sql: &str, params: P) -> Result<ExecuteSummary>
    where
        P: Params + Copy,
    {
        self.run(|conn| {
            let rows_affected = conn.execute(sql, params)?;
            Ok(ExecuteSummary {
                rows_affected,
                last_insert_id: conn.last_insert_rowid(),
            })
        })
    }

    /// Runs a row-returning statement and maps every row.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute), plus any error `map_row` returns.
    pub fn query<T, P, F>(&self, sql: &str, params: P, mut map_row: F) -> Result<Vec<T>>
    where
        P: Params + Copy,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.run(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt
                .query_map(params, &mut map_row)?
                .collect::<rusqlite::Result<Vec<T>>>()?;
            Ok(rows)
        })
    }

    /// Runs a statement expected to return at most one row.
    ///
    /// # Errors
    ///
    /// Same as [`query`](Self::query).
    pub fn query_optional<T, P, F>(&self, sql: &str, params: P, mut map_row: F) -> Result<Option<T>>
    where
        P: Params + Copy,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.run(|conn| Ok(conn.query_row(sql, params, &mut map_row).optional()?))
    }

    /// Runs `f` inside a transaction, committing if it returns `Ok`.
    ///
    /// The transaction rolls back when `f` fails.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or a statement error if the transaction
    /// cannot begin or commit.
    pub fn transaction<T, F>(&self, mut f: F) -> Result<T>
    where
        F: FnMut(&Connection) -> Result<T>,
    {
        self.run(|conn| {
            let tx = conn.unchecked_transaction()?;
            let value = f(&*tx)?;
            tx.commit()?;
            Ok(value)
        })
    }

    /// Opens the session, runs `work`, then closes the session again.
    ///
    /// A failed close is logged and does not mask the result of `work`.
    pub fn unit_of_work<T>(&self, work: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        self.session.open()?;
        let result = work(self);
        if let Err(err) = self.session.close() {
            warn!(database = %self.session.name(), error = %err, "failed to close database");
        }
        result
    }

    fn run<T>(&self, mut op: impl FnMut(&Connection) -> Result<T>) -> Result<T> {
        let mut reopen_attempts = 0;
        loop {
            match self.session.with_connection(&mut op) {
                Err(err) if err.is_not_open() && reopen_attempts < MAX_REOPEN_ATTEMPTS => {
                    reopen_attempts += 1;
                    debug!(
                        database = %self.session.name(),
                        attempt = reopen_attempts,
                        "database closed, reopening before retry"
                    );
                    self.session.open()?;
                }
                other => return other,
            }
        }
    }
}
