//! Conversion between deck records and SQLite rows.
//!
//! Row mappers read columns by position, so every mapper documents the
//! column order its query must select. Booleans are stored as 0/1 integers
//! and timestamps as [`STORAGE_FORMAT`](interview_deck_core::STORAGE_FORMAT)
//! text, though mappers also accept integer epochs and the other layouts
//! [`parse_timestamp`] understands.

use interview_deck_core::{
    AdjacentQuestion, CategoryProgress, CategorySummary, Question, QuestionDetail, SeedCategory,
    SeedQuestion, Timestamp, UserStats, format_timestamp, from_epoch, parse_timestamp,
};
use rusqlite::types::{Type, ValueRef};
use rusqlite::{Connection, Row, params};
use thiserror::Error;

use crate::error::{Result, SqliteError};

/// Columns selected for a full [`Question`], in mapper order.
macro_rules! question_columns {
    () => {
        "q.id, q.category_id, q.uri, q.title, q.sort_order, q.answer, \
         q.is_learned, q.learn_time, q.is_favorite, q.favorite_time, q.create_time"
    };
}
pub(crate) use question_columns;

/// Number of columns [`question_columns!`] selects.
pub(crate) const QUESTION_COLUMN_COUNT: usize = 11;

#[derive(Debug, Error)]
#[error("unrecognized timestamp: {0}")]
struct InvalidTimestamp(String);

fn conversion_failure(idx: usize, ty: Type, raw: impl Into<String>) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(InvalidTimestamp(raw.into())))
}

/// Reads a 0/1 flag column. `NULL` reads as `false`.
pub(crate) fn bool_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<bool> {
    match row.get_ref(idx)? {
        ValueRef::Null => Ok(false),
        ValueRef::Integer(value) => Ok(value != 0),
        ValueRef::Real(value) => Ok(value != 0.0),
        ValueRef::Text(text) => Ok(matches!(text, b"1" | b"true" | b"TRUE")),
        ValueRef::Blob(_) => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "flag".to_string(),
            Type::Blob,
        )),
    }
}

/// Reads an optional timestamp column.
pub(crate) fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Timestamp>> {
    match row.get_ref(idx)? {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(value) => from_epoch(value)
            .map(Some)
            .ok_or_else(|| conversion_failure(idx, Type::Integer, value.to_string())),
        ValueRef::Real(value) => from_epoch(value as i64)
            .map(Some)
            .ok_or_else(|| conversion_failure(idx, Type::Real, value.to_string())),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            parse_timestamp(&text)
                .map(Some)
                .ok_or_else(|| conversion_failure(idx, Type::Text, text.into_owned()))
        }
        ValueRef::Blob(_) => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "timestamp".to_string(),
            Type::Blob,
        )),
    }
}

/// Reads a timestamp column that must not be `NULL`.
pub(crate) fn required_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Timestamp> {
    timestamp_column(row, idx)?.ok_or_else(|| conversion_failure(idx, Type::Null, "NULL"))
}

/// Reads a non-negative count.
pub(crate) fn count_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<u32> {
    let value: i64 = row.get(idx)?;
    u32::try_from(value).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(idx, value))
}

/// Maps the columns selected by [`question_columns!`].
pub(crate) fn question_from_row(row: &Row<'_>) -> rusqlite::Result<Question> {
    Ok(Question {
        id: row.get(0)?,
        category_id: row.get(1)?,
        uri: row.get(2)?,
        title: row.get(3)?,
        sort_order: row.get(4)?,
        answer: row.get(5)?,
        is_learned: bool_column(row, 6)?,
        learn_time: timestamp_column(row, 7)?,
        is_favorite: bool_column(row, 8)?,
        favorite_time: timestamp_column(row, 9)?,
        create_time: required_timestamp(row, 10)?,
    })
}

/// Maps [`question_columns!`] followed by the category name.
pub(crate) fn question_detail_from_row(row: &Row<'_>) -> rusqlite::Result<QuestionDetail> {
    Ok(QuestionDetail {
        question: question_from_row(row)?,
        category_name: row.get(QUESTION_COLUMN_COUNT)?,
    })
}

/// Maps `id, name, create_time, question_count, completed_count`.
pub(crate) fn category_summary_from_row(row: &Row<'_>) -> rusqlite::Result<CategorySummary> {
    Ok(CategorySummary {
        id: row.get(0)?,
        name: row.get(1)?,
        create_time: required_timestamp(row, 2)?,
        question_count: count_column(row, 3)?,
        completed_count: count_column(row, 4)?,
    })
}

/// Maps `id, title, sort_order`.
pub(crate) fn adjacent_from_row(row: &Row<'_>) -> rusqlite::Result<AdjacentQuestion> {
    Ok(AdjacentQuestion {
        id: row.get(0)?,
        title: row.get(1)?,
        sort_order: row.get(2)?,
    })
}

/// Maps `total, completed, favorites`.
pub(crate) fn user_stats_from_row(row: &Row<'_>) -> rusqlite::Result<UserStats> {
    Ok(UserStats {
        total: count_column(row, 0)?,
        completed: count_column(row, 1)?,
        favorites: count_column(row, 2)?,
    })
}

/// Maps `total, completed`.
pub(crate) fn category_progress_from_row(row: &Row<'_>) -> rusqlite::Result<CategoryProgress> {
    Ok(CategoryProgress {
        total: count_column(row, 0)?,
        completed: count_column(row, 1)?,
    })
}

fn storage_time(raw: &str, entity: &str, id: i64) -> Result<String> {
    parse_timestamp(raw)
        .map(|ts| format_timestamp(&ts))
        .ok_or_else(|| {
            SqliteError::ConversionError(format!("{entity} {id} has invalid create_time '{raw}'"))
        })
}

/// Inserts a seed category, normalizing its creation time.
///
/// # Errors
///
/// Returns [`SqliteError::ConversionError`] if the creation time cannot be
/// parsed, or a statement error if the insert fails.
pub fn insert_category(conn: &Connection, category: &SeedCategory) -> Result<()> {
    let create_time = storage_time(&category.create_time, "category", category.id)?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO category (id, name, create_time) VALUES (?1, ?2, ?3)",
    )?;
    stmt.execute(params![category.id, category.name, create_time])?;
    Ok(())
}

/// Inserts a seed question with both flags cleared.
///
/// # Errors
///
/// Returns [`SqliteError::ConversionError`] if the creation time cannot be
/// parsed, or a statement error if the insert fails (unknown category,
/// duplicate id, or clashing sort order).
pub fn insert_question(conn: &Connection, question: &SeedQuestion) -> Result<()> {
    let create_time = storage_time(&question.create_time, "question", question.id)?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO question_map (id, category_id, uri, title, sort_order, answer, create_time)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    stmt.execute(params![
        question.id,
        question.category_id,
        question.uri,
        question.title,
        question.sort_order,
        question.answer,
        create_time,
    ])?;
    Ok(())
}
