//! View-state containers for the interview question deck.
//!
//! Three containers hold what a front end shows between screens:
//!
//! - [`CategoryStore`]: the category list and the selected category
//! - [`QuestionStore`]: one category's questions and a study cursor
//! - [`UserStore`]: statistics, favorites, and a bounded recently-studied list
//!
//! Each container reads through a [`StudySource`] (implemented for
//! [`QuestionBank`](interview_deck_sqlite::QuestionBank)), persists a JSON
//! snapshot of its state to a [`KeyValueStorage`] under a fixed key, and
//! restores that snapshot when constructed. Failures are logged, shown to the
//! user through a [`Notifier`], and returned to the caller.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use interview_deck_sqlite::{QuestionBank, Session, SessionConfig};
//! use interview_deck_store::{CategoryStore, FileStorage, LogNotifier, StoreContext};
//!
//! let session = Arc::new(Session::new(SessionConfig::new("interview_deck", "deck.db")));
//! let ctx = StoreContext::new(
//!     Arc::new(QuestionBank::new(session)),
//!     Arc::new(FileStorage::new(".deck-state")),
//!     Arc::new(LogNotifier),
//! );
//!
//! let mut categories = CategoryStore::new(ctx);
//! categories.fetch_categories().unwrap();
//! ```

mod category;
mod context;
mod error;
mod notify;
mod question;
mod source;
mod storage;
mod user;

#[cfg(test)]
mod testing;

pub use category::{CATEGORY_STORAGE_KEY, CategoryStore};
pub use context::StoreContext;
pub use error::{Result, SourceError, StoreError};
pub use notify::{LogNotifier, Notifier, RecordingNotifier};
pub use question::{QUESTION_STORAGE_KEY, QuestionStore};
pub use source::{SourceResult, StudySource};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, load_snapshot, save_snapshot};
pub use user::{DEFAULT_RECENT_CAPACITY, StudyStats, USER_STORAGE_KEY, UserStore};
