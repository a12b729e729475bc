//! Core domain types for the interview question deck.
//!
//! This crate defines the records shared by every layer of the workspace:
//!
//! - [`Category`] and [`Question`]: the stored entities, with learned and
//!   favorite flags whose timestamps move in step with the flag.
//! - [`CategorySummary`], [`QuestionDetail`], [`AdjacentQuestion`],
//!   [`UserStats`], [`CategoryProgress`]: read models produced by the query
//!   library.
//! - [`SeedPackage`]: a versioned bundle of seed categories and questions.
//!
//! Validation ([`validate_seed`]) catches duplicate ids, dangling category
//! references, and clashing sort orders before a seed reaches the database.
//! Timestamp helpers ([`parse_timestamp`], [`format_timestamp`]) define the
//! one text layout used in storage.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use interview_deck_core::*;
//!
//! let mut question = Question::new(1, 1, "Explain the JMM", 10, Utc::now())
//!     .with_uri("https://example.com/jmm");
//! question.set_favorite(true, Utc::now());
//! assert!(question.favorite_time.is_some());
//!
//! let stats = UserStats { total: 10, completed: 5, favorites: 1 };
//! assert_eq!(stats.completion_rate(), 50.0);
//! ```

mod package;
mod time;
mod types;
mod validate;

pub use package::{SeedCategory, SeedPackage, SeedQuestion};
pub use time::{STORAGE_FORMAT, Timestamp, format_timestamp, from_epoch, parse_timestamp};
pub use types::*;
pub use validate::{ValidationError, validate_seed};
