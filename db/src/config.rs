//! Deck configuration.
//!
//! Defines the YAML-serializable configuration naming the database file,
//! the seed source, the snapshot storage directory, and the recent-list
//! sizes. Every section has defaults, so an empty file or no file at all is
//! valid.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! database:
//!   name: interview_deck
//!   path: interview_deck.db
//! seed:
//!   dir: data/
//!   bundle: null
//! storage:
//!   dir: .deck-state
//! recent:
//!   capacity: 20
//!   default_limit: 5
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::loader::{SeedBuilder, SeedDatabase};

/// Where the SQLite database lives.
///
/// `name` identifies the connection in logs; `path` is the file opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub name: String,
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: "interview_deck".to_string(),
            path: PathBuf::from("interview_deck.db"),
        }
    }
}

/// Seed sources, tried directory first, then bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Directory holding `Category.json` and `question_map.json`.
    pub dir: Option<PathBuf>,
    /// Single [`SeedPackage`](interview_deck_core::SeedPackage) JSON file.
    pub bundle: Option<PathBuf>,
}

impl SeedConfig {
    /// Returns `true` if no seed source is configured.
    pub fn is_empty(&self) -> bool {
        self.dir.is_none() && self.bundle.is_none()
    }

    /// Builds the configured fallback chain and loads the first source that works.
    ///
    /// # Errors
    ///
    /// Returns [`NoSourcesAvailable`](crate::DatabaseError::NoSourcesAvailable)
    /// if nothing is configured or every source fails.
    pub fn load(&self) -> Result<SeedDatabase> {
        let mut builder = SeedBuilder::new();
        if let Some(dir) = &self.dir {
            builder = builder.from_dir(dir);
        }
        if let Some(bundle) = &self.bundle {
            builder = builder.from_bundle(bundle);
        }
        builder.build()
    }
}

/// Where view-state snapshots are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".deck-state"),
        }
    }
}

/// Sizes for the recently-studied lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentConfig {
    /// Maximum entries kept in the user store's recent list.
    pub capacity: usize,
    /// Default number of rows for the recent-questions query.
    pub default_limit: usize,
}

impl Default for RecentConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            default_limit: 5,
        }
    }
}

/// Top-level deck configuration.
///
/// # Examples
///
/// ```
/// use interview_deck_db::DeckConfig;
///
/// let config: DeckConfig = serde_yaml::from_str("recent: { capacity: 50 }").unwrap();
/// assert_eq!(config.recent.capacity, 50);
/// assert_eq!(config.recent.default_limit, 5);
/// assert_eq!(config.database.name, "interview_deck");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    pub database: DatabaseConfig,
    pub seed: SeedConfig,
    pub storage: StorageConfig,
    pub recent: RecentConfig,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            database: DatabaseConfig::default(),
            seed: SeedConfig::default(),
            storage: StorageConfig::default(),
            recent: RecentConfig::default(),
        }
    }
}

impl DeckConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DatabaseError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::DatabaseError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        debug!(path = %path.as_ref().display(), "loaded deck config");
        Ok(config)
    }

    /// Loads the file if it exists, otherwise returns defaults.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load) for a file that exists but is unreadable
    /// or malformed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            debug!(path = %path.as_ref().display(), "no deck config, using defaults");
            Ok(Self::default())
        }
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DatabaseError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::DatabaseError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
