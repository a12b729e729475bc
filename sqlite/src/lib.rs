//! SQLite storage backend for the interview question deck.
//!
//! This crate owns the single database session, the statement gateway that
//! runs SQL over it, the schema lifecycle, and the domain query library the
//! front ends call.
//!
//! # Architecture
//!
//! - **`session`**: one lazily opened handle per database, idempotent
//!   open and close
//! - **`gateway`**: parameterized execute/query/transaction with a single
//!   reopen-and-retry when the session is closed
//! - **`schema`**: table and index DDL
//! - **`migration`**: lifecycle operations (ensure/reset/up/down/seed/status)
//! - **`convert`**: row mappers and seed inserts
//! - **`queries`**: fallible domain statements
//! - **`library`**: [`QuestionBank`], which wraps each query in its own unit
//!   of work and absorbs failures
//!
//! # Quick start: bootstrap
//!
//! ```no_run
//! use std::sync::Arc;
//! use interview_deck_db::SeedDatabase;
//! use interview_deck_sqlite::{Gateway, SchemaManager, Session, SessionConfig};
//!
//! let session = Arc::new(Session::new(SessionConfig::new("interview_deck", "deck.db")));
//! let seed = SeedDatabase::from_dir("data/").unwrap();
//!
//! let manager = SchemaManager::new(Gateway::new(Arc::clone(&session)));
//! manager.ensure_schema(seed.package()).unwrap();
//! ```
//!
//! # Quick start: queries
//!
//! ```no_run
//! use std::sync::Arc;
//! use interview_deck_sqlite::{QuestionBank, Session, SessionConfig};
//!
//! let session = Arc::new(Session::new(SessionConfig::new("interview_deck", "deck.db")));
//! let bank = QuestionBank::new(session);
//!
//! let stats = bank.user_stats();
//! println!("{}/{} learned", stats.completed, stats.total);
//! ```

mod convert;
mod error;
mod gateway;
mod library;
mod migration;
pub mod queries;
pub mod schema;
mod session;

pub use convert::{insert_category, insert_question};
pub use error::{ConnectionError, Result, SqliteError};
pub use gateway::{ExecuteSummary, Gateway};
pub use library::QuestionBank;
pub use migration::{EnsureReport, SchemaManager, SchemaStatus, SeedReport};
pub use queries::DEFAULT_RECENT_LIMIT;
pub use session::{Session, SessionConfig};
