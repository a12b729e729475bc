//! Seed data loading and configuration for the interview question deck.
//!
//! This crate loads the static reference data a fresh database is populated
//! with, and the YAML configuration the front end runs with.
//!
//! # Quick start
//!
//! ```no_run
//! use interview_deck_db::{DeckConfig, SeedDatabase};
//!
//! // Load seed data from a directory of the two seed files
//! let seed = SeedDatabase::from_dir("data/").unwrap();
//! println!("{} categories", seed.package().category_count());
//!
//! // Or let the configuration pick the source
//! let config = DeckConfig::load_or_default("deck.yml").unwrap();
//! let seed = config.seed.load().unwrap();
//! ```

mod config;
mod error;
mod loader;

pub use config::{DatabaseConfig, DeckConfig, RecentConfig, SeedConfig, StorageConfig};
pub use error::{DatabaseError, Result};
pub use loader::{CATEGORY_FILE, QUESTION_FILE, SeedBuilder, SeedDatabase, SeedSource};
