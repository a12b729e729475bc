//! Schema lifecycle operations for the deck database.
//!
//! Provides [`SchemaManager`] for creating, dropping, seeding, and resetting
//! the deck tables, plus the bootstrap path [`ensure_schema`] that runs on
//! every start. All mutation operations run inside a transaction.
//!
//! [`ensure_schema`]: SchemaManager::ensure_schema
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use interview_deck_db::SeedDatabase;
//! use interview_deck_sqlite::{Gateway, SchemaManager, Session, SessionConfig};
//!
//! let session = Arc::new(Session::new(SessionConfig::new("interview_deck", "deck.db")));
//! let manager = SchemaManager::new(Gateway::new(session));
//! let seed = SeedDatabase::from_dir("data/").unwrap();
//!
//! // Create whatever is missing and seed empty tables
//! let report = manager.ensure_schema(seed.package()).unwrap();
//! println!("created {:?}", report.tables_created);
//!
//! // Check status
//! let status = manager.status().unwrap();
//! assert!(status.tables_exist);
//! ```

use interview_deck_core::{SeedPackage, validate_seed};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info};

use crate::convert;
use crate::error::{Result, SqliteError};
use crate::gateway::Gateway;
use crate::schema::{
    CATEGORY_TABLE, QUESTION_TABLE, TABLES, create_table_sql, generate_drop_sql,
    generate_schema_sql,
};

/// Manages the lifecycle of the deck tables.
///
/// Every public operation is one unit of work: the session is opened, the
/// operation runs, and the session is closed again.
#[derive(Debug, Clone)]
pub struct SchemaManager {
    gateway: Gateway,
}

impl SchemaManager {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Returns the gateway the manager runs statements through.
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Creates all tables and indexes.
    ///
    /// Uses `CREATE TABLE IF NOT EXISTS` so it is safe to call multiple times.
    pub fn up(&self) -> Result<()> {
        self.gateway.unit_of_work(|gw| gw.transaction(create_all))
    }

    /// Drops all tables, including the legacy side tables, in reverse
    /// dependency order.
    pub fn down(&self) -> Result<()> {
        self.gateway.unit_of_work(|gw| gw.transaction(drop_all))
    }

    /// Reports whether the tables exist and how many rows they hold.
    pub fn status(&self) -> Result<SchemaStatus> {
        self.gateway.unit_of_work(|gw| {
            gw.transaction(|conn| {
                if !missing_tables(conn)?.is_empty() {
                    return Ok(SchemaStatus::default());
                }
                let (learned_count, favorite_count) = conn.query_row(
                    "SELECT COUNT(CASE WHEN is_learned = 1 THEN 1 END),
                            COUNT(CASE WHEN is_favorite = 1 THEN 1 END)
                     FROM question_map",
                    [],
                    |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
                )?;
                Ok(SchemaStatus {
                    tables_exist: true,
                    category_count: count_rows(conn, CATEGORY_TABLE)?,
                    question_count: count_rows(conn, QUESTION_TABLE)?,
                    learned_count: to_count(learned_count)?,
                    favorite_count: to_count(favorite_count)?,
                })
            })
        })
    }

    /// Imports a seed package into existing tables.
    ///
    /// The package is validated first; nothing is written if validation or
    /// any insert fails.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::ImportError`] if the package is invalid or an
    /// insert fails.
    pub fn seed(&self, package: &SeedPackage) -> Result<SeedReport> {
        check_package(package)?;
        self.gateway
            .unit_of_work(|gw| gw.transaction(|conn| import(conn, package, true, true)))
    }

    /// Brings the database to a usable state without touching existing data.
    ///
    /// Missing tables are created. The category table is seeded only if it
    /// is empty, and the question table likewise, so a second call on the
    /// same database changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::MigrationError`] if a table cannot be created,
    /// or [`SqliteError::ImportError`] if seeding fails. Either way no partial
    /// seed is left behind.
    pub fn ensure_schema(&self, package: &SeedPackage) -> Result<EnsureReport> {
        self.gateway.unit_of_work(|gw| {
            gw.transaction(|conn| {
                let missing = missing_tables(conn)?;
                for table in &missing {
                    let sql = create_table_sql(table).ok_or_else(|| {
                        SqliteError::MigrationError(format!("no definition for table {table}"))
                    })?;
                    conn.execute_batch(sql).map_err(|e| {
                        SqliteError::MigrationError(format!("failed to create {table}: {e}"))
                    })?;
                    info!(table, "created table");
                }

                let seed_categories = count_rows(conn, CATEGORY_TABLE)? == 0;
                let seed_questions = count_rows(conn, QUESTION_TABLE)? == 0;
                if (seed_categories || seed_questions) && !package.is_empty() {
                    check_package(package)?;
                }
                let seed = import(conn, package, seed_categories, seed_questions)?;

                Ok(EnsureReport {
                    tables_created: missing.into_iter().map(str::to_string).collect(),
                    seed,
                })
            })
        })
    }

    /// Drops every table, recreates the schema, and seeds it.
    ///
    /// Learned and favorite state is discarded.
    pub fn reset_schema(&self, package: &SeedPackage) -> Result<SeedReport> {
        check_package(package)?;
        self.gateway.unit_of_work(|gw| {
            gw.transaction(|conn| {
                drop_all(conn)?;
                create_all(conn)?;
                import(conn, package, true, true)
            })
        })
    }
}

fn create_all(conn: &Connection) -> Result<()> {
    conn.execute_batch(&generate_schema_sql())
        .map_err(|e| SqliteError::MigrationError(format!("failed to create tables: {e}")))
}

fn drop_all(conn: &Connection) -> Result<()> {
    conn.execute_batch(&generate_drop_sql())
        .map_err(|e| SqliteError::MigrationError(format!("failed to drop tables: {e}")))
}

fn check_package(package: &SeedPackage) -> Result<()> {
    let errors = validate_seed(package);
    if errors.is_empty() {
        return Ok(());
    }
    let detail = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(SqliteError::ImportError(format!(
        "seed package failed validation ({} problems): {detail}",
        errors.len()
    )))
}

fn import(
    conn: &Connection,
    package: &SeedPackage,
    categories: bool,
    questions: bool,
) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    if categories {
        for category in &package.categories {
            convert::insert_category(conn, category).map_err(|e| {
                SqliteError::ImportError(format!("category {}: {e}", category.id))
            })?;
            report.categories_inserted += 1;
        }
    }
    if questions {
        for question in &package.questions {
            convert::insert_question(conn, question).map_err(|e| {
                SqliteError::ImportError(format!("question {}: {e}", question.id))
            })?;
            report.questions_inserted += 1;
        }
    }

    debug!(
        categories = report.categories_inserted,
        questions = report.questions_inserted,
        "imported seed rows"
    );
    Ok(report)
}

/// Tables from [`TABLES`] that do not exist yet, in creation order.
fn missing_tables(conn: &Connection) -> Result<Vec<&'static str>> {
    let mut stmt =
        conn.prepare_cached("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1")?;
    let mut missing = Vec::new();
    for table in TABLES {
        let count: i64 = stmt.query_row([table], |row| row.get(0))?;
        if count == 0 {
            missing.push(table);
        }
    }
    Ok(missing)
}

/// Counts rows in one of the deck tables.
fn count_rows(conn: &Connection, table: &'static str) -> Result<usize> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    to_count(count)
}

fn to_count(value: i64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| SqliteError::ConversionError(format!("row count {value} out of range")))
}

/// Snapshot of the schema returned by [`SchemaManager::status`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaStatus {
    /// Whether both deck tables exist.
    pub tables_exist: bool,
    pub category_count: usize,
    pub question_count: usize,
    /// Questions currently marked learned.
    pub learned_count: usize,
    /// Questions currently marked favorite.
    pub favorite_count: usize,
}

/// Rows inserted by a seed operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub categories_inserted: usize,
    pub questions_inserted: usize,
}

impl SeedReport {
    /// Returns `true` if nothing was inserted.
    pub fn is_empty(&self) -> bool {
        self.categories_inserted == 0 && self.questions_inserted == 0
    }
}

/// Outcome of [`SchemaManager::ensure_schema`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnsureReport {
    /// Tables that were missing and got created.
    pub tables_created: Vec<String>,
    /// Seed rows inserted into tables that were empty.
    pub seed: SeedReport,
}

impl EnsureReport {
    /// Returns `true` if the database was already fully set up.
    pub fn is_noop(&self) -> bool {
        self.tables_created.is_empty() && self.seed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use interview_deck_core::{SeedCategory, SeedQuestion};

    use super::*;
    use crate::session::{Session, SessionConfig};

    fn temp_manager() -> (tempfile::TempDir, SchemaManager) {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(SessionConfig::new("test", dir.path().join("deck.db")));
        (dir, SchemaManager::new(Gateway::new(Arc::new(session))))
    }

    #[test]
    fn test_negative_count_is_conversion_error() {
        assert_eq!(to_count(3).unwrap(), 3);
        assert!(matches!(to_count(-1), Err(SqliteError::ConversionError(_))));
    }

    fn sample_package() -> SeedPackage {
        let mut package = SeedPackage::new("1.0.0", "2024-01-01T00:00:00Z");
        for id in 1..=2 {
            package.categories.push(SeedCategory {
                id,
                name: format!("Category {id}"),
                create_time: format!("2024-01-0{id} 00:00:00"),
            });
        }
        for id in 1..=3 {
            package.questions.push(SeedQuestion {
                id,
                category_id: 1,
                uri: format!("https://example.com/{id}"),
                title: format!("Question {id}"),
                answer: None,
                sort_order: id * 10,
                create_time: "2024-01-01 00:00:00".into(),
            });
        }
        package
    }

    #[test]
    fn test_status_on_empty_database() {
        let (_dir, manager) = temp_manager();
        let status = manager.status().unwrap();
        assert!(!status.tables_exist);
        assert_eq!(status.question_count, 0);
        assert!(!manager.gateway().session().is_open());
    }

    #[test]
    fn test_up_is_idempotent() {
        let (_dir, manager) = temp_manager();
        manager.up().unwrap();
        manager.up().unwrap();
        assert!(manager.status().unwrap().tables_exist);
    }

    #[test]
    fn test_down_removes_tables() {
        let (_dir, manager) = temp_manager();
        manager.up().unwrap();
        manager.down().unwrap();
        assert!(!manager.status().unwrap().tables_exist);
        manager.down().unwrap();
    }

    #[test]
    fn test_seed_counts() {
        let (_dir, manager) = temp_manager();
        manager.up().unwrap();
        let report = manager.seed(&sample_package()).unwrap();
        assert_eq!(report.categories_inserted, 2);
        assert_eq!(report.questions_inserted, 3);

        let status = manager.status().unwrap();
        assert_eq!(status.category_count, 2);
        assert_eq!(status.question_count, 3);
        assert_eq!(status.learned_count, 0);
    }

    #[test]
    fn test_seed_invalid_package_writes_nothing() {
        let (_dir, manager) = temp_manager();
        manager.up().unwrap();
        let mut package = sample_package();
        package.questions[2].category_id = 99;

        let err = manager.seed(&package).unwrap_err();
        assert!(matches!(err, SqliteError::ImportError(_)));
        assert_eq!(manager.status().unwrap().category_count, 0);
    }

    #[test]
    fn test_ensure_schema_creates_and_seeds() {
        let (_dir, manager) = temp_manager();
        let report = manager.ensure_schema(&sample_package()).unwrap();
        assert_eq!(report.tables_created, vec!["category", "question_map"]);
        assert_eq!(report.seed.questions_inserted, 3);
    }

    #[test]
    fn test_ensure_schema_twice_is_noop() {
        let (_dir, manager) = temp_manager();
        manager.ensure_schema(&sample_package()).unwrap();
        let second = manager.ensure_schema(&sample_package()).unwrap();
        assert!(second.is_noop());
        assert_eq!(manager.status().unwrap().question_count, 3);
    }

    #[test]
    fn test_ensure_schema_seeds_only_empty_table() {
        let (_dir, manager) = temp_manager();
        manager.up().unwrap();
        manager
            .gateway()
            .unit_of_work(|gw| {
                gw.execute(
                    "INSERT INTO category (id, name, create_time) VALUES (1, 'Category 1', '2024-01-01 00:00:00.000')",
                    [],
                )
            })
            .unwrap();

        let report = manager.ensure_schema(&sample_package()).unwrap();
        assert!(report.tables_created.is_empty());
        assert_eq!(report.seed.categories_inserted, 0);
        assert_eq!(report.seed.questions_inserted, 3);
        assert_eq!(manager.status().unwrap().category_count, 1);
    }

    #[test]
    fn test_reset_schema_clears_progress() {
        let (_dir, manager) = temp_manager();
        manager.ensure_schema(&sample_package()).unwrap();
        manager
            .gateway()
            .unit_of_work(|gw| {
                gw.execute(
                    "UPDATE question_map SET is_learned = 1, learn_time = '2024-02-01 00:00:00.000'",
                    [],
                )
            })
            .unwrap();
        assert_eq!(manager.status().unwrap().learned_count, 3);

        let report = manager.reset_schema(&sample_package()).unwrap();
        assert_eq!(report.questions_inserted, 3);
        assert_eq!(manager.status().unwrap().learned_count, 0);
    }

    #[test]
    fn test_reset_drops_legacy_tables() {
        let (_dir, manager) = temp_manager();
        manager
            .gateway()
            .unit_of_work(|gw| gw.execute("CREATE TABLE favorites (question_id INTEGER)", []))
            .unwrap();
        manager.reset_schema(&sample_package()).unwrap();

        let legacy = manager
            .gateway()
            .unit_of_work(|gw| {
                gw.query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name='favorites'",
                    [],
                    |row| row.get::<_, String>(0),
                )
            })
            .unwrap();
        assert!(legacy.is_empty());
    }
}
