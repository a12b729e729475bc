//! Fallible domain queries over the deck tables.
//!
//! Each function runs one statement through a [`Gateway`] and maps the
//! result into core types. Nothing here opens or closes the session; wrap
//! calls in [`Gateway::unit_of_work`], or use
//! [`QuestionBank`](crate::QuestionBank), which does that and absorbs errors.
//!
//! Write functions return `Ok(false)` when no row matched the id.

use interview_deck_core::{
    AdjacentQuestion, CategoryProgress, CategorySummary, Direction, Question, QuestionDetail,
    Timestamp, UserStats, format_timestamp,
};
use rusqlite::params;

use crate::convert::{self, question_columns};
use crate::error::Result;
use crate::gateway::Gateway;

/// Rows returned by [`recent_questions`] when no limit is given.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

const CATEGORIES_SQL: &str = "
SELECT c.id, c.name, c.create_time,
       COUNT(q.id),
       COUNT(CASE WHEN q.is_learned = 1 THEN 1 END)
FROM category c
LEFT JOIN question_map q ON q.category_id = c.id
GROUP BY c.id, c.name, c.create_time
ORDER BY c.create_time ASC, c.id ASC";

const QUESTIONS_BY_CATEGORY_SQL: &str = concat!(
    "SELECT ",
    question_columns!(),
    " FROM question_map q WHERE q.category_id = ?1 ORDER BY q.sort_order ASC"
);

const QUESTION_DETAIL_SQL: &str = concat!(
    "SELECT ",
    question_columns!(),
    ", c.name FROM question_map q LEFT JOIN category c ON c.id = q.category_id WHERE q.id = ?1"
);

const PREVIOUS_QUESTION_SQL: &str = "
SELECT q.id, q.title, q.sort_order
FROM question_map q
WHERE q.category_id = ?1
  AND q.sort_order < (SELECT sort_order FROM question_map WHERE id = ?2)
ORDER BY q.sort_order DESC
LIMIT 1";

const NEXT_QUESTION_SQL: &str = "
SELECT q.id, q.title, q.sort_order
FROM question_map q
WHERE q.category_id = ?1
  AND q.sort_order > (SELECT sort_order FROM question_map WHERE id = ?2)
ORDER BY q.sort_order ASC
LIMIT 1";

// The timestamp only moves when the flag goes from 0 to 1.
const MARK_LEARNED_SQL: &str = "
UPDATE question_map
SET learn_time = CASE WHEN is_learned = 1 THEN learn_time ELSE ?2 END,
    is_learned = 1
WHERE id = ?1";

const CANCEL_LEARNED_SQL: &str =
    "UPDATE question_map SET is_learned = 0, learn_time = NULL WHERE id = ?1";

// Both CASE expressions see the pre-update flag.
const TOGGLE_FAVORITE_SQL: &str = "
UPDATE question_map
SET is_favorite = CASE WHEN is_favorite = 0 THEN 1 ELSE 0 END,
    favorite_time = CASE WHEN is_favorite = 0 THEN ?2 ELSE NULL END
WHERE id = ?1";

const FAVORITES_SQL: &str = concat!(
    "SELECT ",
    question_columns!(),
    ", c.name FROM question_map q JOIN category c ON c.id = q.category_id \
     WHERE q.is_favorite = 1 ORDER BY q.favorite_time DESC, q.id DESC"
);

const USER_STATS_SQL: &str = "
SELECT COUNT(*),
       COUNT(CASE WHEN is_learned = 1 THEN 1 END),
       COUNT(CASE WHEN is_favorite = 1 THEN 1 END)
FROM question_map";

const RECENT_QUESTIONS_SQL: &str = concat!(
    "SELECT ",
    question_columns!(),
    ", c.name FROM question_map q JOIN category c ON c.id = q.category_id \
     WHERE q.is_learned = 1 ORDER BY q.learn_time DESC, q.id DESC LIMIT ?1"
);

const CATEGORY_PROGRESS_SQL: &str = "
SELECT COUNT(*), COUNT(CASE WHEN is_learned = 1 THEN 1 END)
FROM question_map
WHERE category_id = ?1";

/// All categories with their question and learned counts, oldest first.
pub fn categories(gateway: &Gateway) -> Result<Vec<CategorySummary>> {
    gateway.query(CATEGORIES_SQL, [], convert::category_summary_from_row)
}

/// Questions in a category ordered by ascending sort order.
pub fn questions_by_category(gateway: &Gateway, category_id: i64) -> Result<Vec<Question>> {
    gateway.query(
        QUESTIONS_BY_CATEGORY_SQL,
        params![category_id],
        convert::question_from_row,
    )
}

/// One question with its category name.
pub fn question_detail(gateway: &Gateway, id: i64) -> Result<Option<QuestionDetail>> {
    gateway.query_optional(
        QUESTION_DETAIL_SQL,
        params![id],
        convert::question_detail_from_row,
    )
}

/// The neighbouring question of `current_id` within `category_id`.
///
/// Returns `None` at either end of the category, or if `current_id` does
/// not exist.
pub fn adjacent_question(
    gateway: &Gateway,
    current_id: i64,
    category_id: i64,
    direction: Direction,
) -> Result<Option<AdjacentQuestion>> {
    let sql = match direction {
        Direction::Prev => PREVIOUS_QUESTION_SQL,
        Direction::Next => NEXT_QUESTION_SQL,
    };
    gateway.query_optional(sql, params![category_id, current_id], convert::adjacent_from_row)
}

/// Marks a question learned as of `at`.
pub fn mark_learned(gateway: &Gateway, id: i64, at: Timestamp) -> Result<bool> {
    let stamp = format_timestamp(&at);
    let summary = gateway.execute(MARK_LEARNED_SQL, params![id, stamp])?;
    Ok(summary.rows_affected > 0)
}

/// Clears the learned flag and its timestamp.
pub fn cancel_learned(gateway: &Gateway, id: i64) -> Result<bool> {
    let summary = gateway.execute(CANCEL_LEARNED_SQL, params![id])?;
    Ok(summary.rows_affected > 0)
}

/// Flips the favorite flag, stamping `at` when it becomes set.
pub fn toggle_favorite(gateway: &Gateway, id: i64, at: Timestamp) -> Result<bool> {
    let stamp = format_timestamp(&at);
    let summary = gateway.execute(TOGGLE_FAVORITE_SQL, params![id, stamp])?;
    Ok(summary.rows_affected > 0)
}

/// Favorite questions, most recently favorited first.
pub fn favorites(gateway: &Gateway) -> Result<Vec<QuestionDetail>> {
    gateway.query(FAVORITES_SQL, [], convert::question_detail_from_row)
}

/// Deck-wide totals.
pub fn user_stats(gateway: &Gateway) -> Result<UserStats> {
    let stats = gateway.query_optional(USER_STATS_SQL, [], convert::user_stats_from_row)?;
    Ok(stats.unwrap_or_default())
}

/// Learned questions, most recently learned first.
pub fn recent_questions(gateway: &Gateway, limit: Option<usize>) -> Result<Vec<QuestionDetail>> {
    let limit = i64::try_from(limit.unwrap_or(DEFAULT_RECENT_LIMIT)).unwrap_or(i64::MAX);
    gateway.query(
        RECENT_QUESTIONS_SQL,
        params![limit],
        convert::question_detail_from_row,
    )
}

/// Question and learned counts for one category.
pub fn category_progress(gateway: &Gateway, category_id: i64) -> Result<CategoryProgress> {
    let progress = gateway.query_optional(
        CATEGORY_PROGRESS_SQL,
        params![category_id],
        convert::category_progress_from_row,
    )?;
    Ok(progress.unwrap_or_default())
}
