//! The containers' view of the study data.

use interview_deck_core::{CategorySummary, Question, QuestionDetail, Timestamp, UserStats};
use interview_deck_sqlite::{QuestionBank, SqliteError, queries};

use crate::error::SourceError;

/// Result of a [`StudySource`] call.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Where containers read study data from and write progress to.
///
/// Write methods return `Ok(false)` when no question has the given id.
pub trait StudySource: Send + Sync {
    fn categories(&self) -> SourceResult<Vec<CategorySummary>>;

    fn questions_by_category(&self, category_id: i64) -> SourceResult<Vec<Question>>;

    fn question_detail(&self, id: i64) -> SourceResult<Option<QuestionDetail>>;

    fn mark_learned(&self, id: i64, at: Timestamp) -> SourceResult<bool>;

    fn cancel_learned(&self, id: i64) -> SourceResult<bool>;

    fn toggle_favorite(&self, id: i64, at: Timestamp) -> SourceResult<bool>;

    fn favorites(&self) -> SourceResult<Vec<QuestionDetail>>;

    fn user_stats(&self) -> SourceResult<UserStats>;

    fn recent_questions(&self, limit: Option<usize>) -> SourceResult<Vec<QuestionDetail>>;
}

fn source_error(operation: &'static str) -> impl FnOnce(SqliteError) -> SourceError {
    move |err| SourceError::new(operation, err.to_string())
}

/// Runs each call as its own unit of work and keeps the error, so the
/// containers can tell a failure from an empty result.
impl StudySource for QuestionBank {
    fn categories(&self) -> SourceResult<Vec<CategorySummary>> {
        self.run(queries::categories)
            .map_err(source_error("categories"))
    }

    fn questions_by_category(&self, category_id: i64) -> SourceResult<Vec<Question>> {
        self.run(|gw| queries::questions_by_category(gw, category_id))
            .map_err(source_error("questions_by_category"))
    }

    fn question_detail(&self, id: i64) -> SourceResult<Option<QuestionDetail>> {
        self.run(|gw| queries::question_detail(gw, id))
            .map_err(source_error("question_detail"))
    }

    fn mark_learned(&self, id: i64, at: Timestamp) -> SourceResult<bool> {
        self.run(|gw| queries::mark_learned(gw, id, at))
            .map_err(source_error("mark_learned"))
    }

    fn cancel_learned(&self, id: i64) -> SourceResult<bool> {
        self.run(|gw| queries::cancel_learned(gw, id))
            .map_err(source_error("cancel_learned"))
    }

    fn toggle_favorite(&self, id: i64, at: Timestamp) -> SourceResult<bool> {
        self.run(|gw| queries::toggle_favorite(gw, id, at))
            .map_err(source_error("toggle_favorite"))
    }

    fn favorites(&self) -> SourceResult<Vec<QuestionDetail>> {
        self.run(queries::favorites).map_err(source_error("favorites"))
    }

    fn user_stats(&self) -> SourceResult<UserStats> {
        self.run(queries::user_stats).map_err(source_error("user_stats"))
    }

    fn recent_questions(&self, limit: Option<usize>) -> SourceResult<Vec<QuestionDetail>> {
        self.run(|gw| queries::recent_questions(gw, limit))
            .map_err(source_error("recent_questions"))
    }
}
