//! Seed loading with builder pattern and fallback chains.
//!
//! Provides [`SeedDatabase`] for holding a loaded [`SeedPackage`] and
//! [`SeedBuilder`] for constructing one from multiple sources with automatic
//! fallback.
//!
//! # Loading patterns
//!
//! ```no_run
//! use interview_deck_db::SeedDatabase;
//!
//! // Load from a directory holding Category.json and question_map.json
//! let seed = SeedDatabase::from_dir("data/").unwrap();
//! println!("{} questions", seed.package().question_count());
//!
//! // Load from a single SeedPackage JSON bundle
//! let seed = SeedDatabase::from_bundle("deck.json").unwrap();
//!
//! // Use the builder for a fallback chain
//! let seed = SeedDatabase::builder()
//!     .from_dir("data/")
//!     .from_bundle("deck.json")
//!     .build()
//!     .unwrap();
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use interview_deck_core::{SeedCategory, SeedPackage, SeedQuestion};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{DatabaseError, Result};

/// File name of the category list inside a seed directory.
pub const CATEGORY_FILE: &str = "Category.json";

/// File name of the question list inside a seed directory.
pub const QUESTION_FILE: &str = "question_map.json";

/// Version recorded for packages assembled from a seed directory.
const DIRECTORY_PACKAGE_VERSION: &str = "1.0.0";

/// Describes where a [`SeedDatabase`] was loaded from.
#[derive(Debug, Clone)]
pub enum SeedSource {
    /// Loaded from a directory with [`CATEGORY_FILE`] and [`QUESTION_FILE`].
    Directory(PathBuf),
    /// Loaded from a single [`SeedPackage`] JSON file.
    Bundle(PathBuf),
    /// Built from a package already in memory.
    Inline,
    /// Loaded via a fallback chain of multiple sources.
    Multiple(Vec<SeedSource>),
}

/// A loaded seed dataset and where it came from.
///
/// # Examples
///
/// ```
/// use interview_deck_core::SeedPackage;
/// use interview_deck_db::SeedDatabase;
///
/// let seed = SeedDatabase::from_package(SeedPackage::new("1.0.0", "2024-01-01T00:00:00Z"));
/// assert!(seed.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct SeedDatabase {
    package: SeedPackage,
    source: SeedSource,
}

impl SeedDatabase {
    /// Returns a new [`SeedBuilder`] for configuring a fallback chain.
    pub fn builder() -> SeedBuilder {
        SeedBuilder::new()
    }

    /// Loads the two seed files from a directory.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::MissingSeedFile`] if either file is absent,
    /// [`DatabaseError::IoError`] if a file cannot be opened, or
    /// [`DatabaseError::JsonError`] if a file contains invalid JSON.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let categories: Vec<SeedCategory> = read_json(&path.join(CATEGORY_FILE))?;
        let questions: Vec<SeedQuestion> = read_json(&path.join(QUESTION_FILE))?;
        debug!(
            dir = %path.display(),
            categories = categories.len(),
            questions = questions.len(),
            "loaded seed directory"
        );

        let mut package = SeedPackage::new(DIRECTORY_PACKAGE_VERSION, "");
        package.categories = categories;
        package.questions = questions;

        Ok(Self {
            package,
            source: SeedSource::Directory(path.to_path_buf()),
        })
    }

    /// Loads a single [`SeedPackage`] JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::MissingSeedFile`] if the file does not exist,
    /// [`DatabaseError::IoError`] if it cannot be read, or
    /// [`DatabaseError::JsonError`] if parsing fails.
    pub fn from_bundle(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let package: SeedPackage = read_json(path)?;
        debug!(
            bundle = %path.display(),
            categories = package.category_count(),
            questions = package.question_count(),
            "loaded seed bundle"
        );
        Ok(Self {
            package,
            source: SeedSource::Bundle(path.to_path_buf()),
        })
    }

    /// Wraps a package already held in memory.
    pub fn from_package(package: SeedPackage) -> Self {
        Self {
            package,
            source: SeedSource::Inline,
        }
    }

    /// Returns the loaded package.
    pub fn package(&self) -> &SeedPackage {
        &self.package
    }

    /// Consumes the database and returns the package.
    pub fn into_package(self) -> SeedPackage {
        self.package
    }

    /// Looks up a seed category by id.
    pub fn category(&self, id: i64) -> Option<&SeedCategory> {
        self.package.categories.iter().find(|c| c.id == id)
    }

    /// Looks up a seed question by id.
    pub fn question(&self, id: i64) -> Option<&SeedQuestion> {
        self.package.questions.iter().find(|q| q.id == id)
    }

    /// Returns `true` if the seed has no categories and no questions.
    pub fn is_empty(&self) -> bool {
        self.package.is_empty()
    }

    /// Returns a reference to the source metadata.
    pub fn source(&self) -> &SeedSource {
        &self.source
    }

    /// Writes the seed back out as a directory of the two seed files.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::IoError`] if the directory or files cannot be
    /// written.
    pub fn write_dir(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;
        let file = File::create(path.join(CATEGORY_FILE))?;
        serde_json::to_writer_pretty(file, &self.package.categories)?;
        let file = File::create(path.join(QUESTION_FILE))?;
        serde_json::to_writer_pretty(file, &self.package.questions)?;
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.is_file() {
        return Err(DatabaseError::MissingSeedFile(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Builder for constructing a [`SeedDatabase`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`DatabaseError::NoSourcesAvailable`] is returned.
///
/// # Example
///
/// ```no_run
/// use interview_deck_db::SeedDatabase;
///
/// let seed = SeedDatabase::builder()
///     .from_dir("/opt/deck/data/")
///     .from_bundle("/opt/deck/deck.json")
///     .build()
///     .unwrap();
/// ```
pub struct SeedBuilder {
    sources: Vec<SeedSource>,
}

impl SeedBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Adds a seed directory as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(SeedSource::Directory(path.into()));
        self
    }

    /// Adds a [`SeedPackage`] bundle file as a source.
    pub fn from_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(SeedSource::Bundle(path.into()));
        self
    }

    /// Attempts to load seed data from configured sources in order.
    ///
    /// Returns the first successfully loaded database. If all sources fail,
    /// returns [`DatabaseError::NoSourcesAvailable`].
    pub fn build(self) -> Result<SeedDatabase> {
        if self.sources.is_empty() {
            return Err(DatabaseError::NoSourcesAvailable);
        }

        let all_sources = self.sources.clone();

        for source in &self.sources {
            let result = match source {
                SeedSource::Directory(path) => SeedDatabase::from_dir(path),
                SeedSource::Bundle(path) => SeedDatabase::from_bundle(path),
                SeedSource::Inline | SeedSource::Multiple(_) => continue,
            };

            match result {
                Ok(mut seed) => {
                    seed.source = SeedSource::Multiple(all_sources);
                    return Ok(seed);
                }
                Err(err) => warn!(?source, error = %err, "seed source unavailable, trying next"),
            }
        }

        Err(DatabaseError::NoSourcesAvailable)
    }
}

impl Default for SeedBuilder {
    fn default() -> Self {
        Self::new()
    }
}
