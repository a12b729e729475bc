//! SQL schema for the deck tables.
//!
//! # Table structure
//!
//! - `category`: the fixed set of question groups
//! - `question_map`: questions, with per-question learned and favorite
//!   flags stored alongside their timestamps
//!
//! Learned and favorite state live in columns on `question_map` rather than
//! side tables. The legacy side tables `user_progress` and `favorites` are
//! only ever dropped, so a reset also cleans up databases written by older
//! builds.

/// Name of the category table.
pub const CATEGORY_TABLE: &str = "category";

/// Name of the question table.
pub const QUESTION_TABLE: &str = "question_map";

/// Tables in creation order.
pub const TABLES: [&str; 2] = [CATEGORY_TABLE, QUESTION_TABLE];

/// Side tables from the older progress layout, dropped on reset.
pub const LEGACY_TABLES: [&str; 2] = ["favorites", "user_progress"];

/// Index names created alongside the tables.
pub const INDEXES: [&str; 3] = ["idx_question_category", "idx_question_uri", "idx_question_sort"];

const CREATE_CATEGORY_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS category (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    create_time TEXT NOT NULL
);
"#;

const CREATE_QUESTION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS question_map (
    id INTEGER PRIMARY KEY,
    category_id INTEGER NOT NULL,
    uri TEXT NOT NULL,
    title TEXT NOT NULL,
    sort_order INTEGER NOT NULL,
    answer TEXT,
    is_favorite INTEGER NOT NULL DEFAULT 0 CHECK (is_favorite IN (0, 1)),
    favorite_time TEXT,
    is_learned INTEGER NOT NULL DEFAULT 0 CHECK (is_learned IN (0, 1)),
    learn_time TEXT,
    create_time TEXT NOT NULL,
    FOREIGN KEY (category_id) REFERENCES category(id)
);

CREATE INDEX IF NOT EXISTS idx_question_category ON question_map(category_id);
CREATE INDEX IF NOT EXISTS idx_question_uri ON question_map(uri);
-- Unique: sort order identifies a question's position within its category.
CREATE UNIQUE INDEX IF NOT EXISTS idx_question_sort ON question_map(category_id, sort_order);
"#;

/// Returns the `CREATE` statements for one table and its indexes.
///
/// Returns `None` for names outside [`TABLES`].
pub fn create_table_sql(table: &str) -> Option<&'static str> {
    match table {
        CATEGORY_TABLE => Some(CREATE_CATEGORY_SQL),
        QUESTION_TABLE => Some(CREATE_QUESTION_SQL),
        _ => None,
    }
}

/// Generates the complete SQL schema for all tables.
///
/// Every statement uses `IF NOT EXISTS`, so the batch is safe to re-run
/// against a database that already holds data.
pub fn generate_schema_sql() -> String {
    format!("{CREATE_CATEGORY_SQL}{CREATE_QUESTION_SQL}")
}

/// Generates `DROP TABLE` statements in reverse dependency order.
///
/// Legacy side tables go first since they reference `question_map`.
pub fn generate_drop_sql() -> String {
    let mut sql = String::new();
    for table in LEGACY_TABLES.iter().chain(TABLES.iter().rev()) {
        sql.push_str(&format!("DROP TABLE IF EXISTS {table};\n"));
    }
    sql
}
