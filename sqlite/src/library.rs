//! Error-absorbing domain API for front ends.
//!
//! [`QuestionBank`] runs each [`queries`](crate::queries) function as its own
//! unit of work: open the session, run the statement, close the session.
//! Failures are logged and replaced by an empty value (`[]`, `None`, zeroed
//! stats, or `false`), so callers never see a database error.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use interview_deck_core::Direction;
//! use interview_deck_sqlite::{QuestionBank, Session, SessionConfig};
//!
//! let session = Arc::new(Session::new(SessionConfig::new("interview_deck", "deck.db")));
//! let bank = QuestionBank::new(session);
//!
//! for category in bank.categories() {
//!     println!("{}: {}/{}", category.name, category.completed_count, category.question_count);
//! }
//! if let Some(next) = bank.adjacent_question(3, 1, Direction::Next) {
//!     bank.mark_learned(next.id);
//! }
//! ```

use std::sync::Arc;

use chrono::Utc;
use interview_deck_core::{
    AdjacentQuestion, CategoryProgress, CategorySummary, Direction, Question, QuestionDetail,
    Timestamp, UserStats,
};
use tracing::warn;

use crate::error::Result;
use crate::gateway::Gateway;
use crate::queries;
use crate::session::Session;

/// Reads and writes study progress without surfacing errors.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    gateway: Gateway,
}

impl QuestionBank {
    pub fn new(session: Arc<Session>) -> Self {
        Self::with_gateway(Gateway::new(session))
    }

    pub fn with_gateway(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Runs `work` as one unit of work and returns its result unabsorbed.
    ///
    /// Use this when a caller needs to tell "no rows" apart from a failure.
    pub fn run<T>(&self, work: impl FnOnce(&Gateway) -> Result<T>) -> Result<T> {
        self.gateway.unit_of_work(work)
    }

    fn absorb<T: Default>(&self, operation: &'static str, result: Result<T>) -> T {
        result.unwrap_or_else(|err| {
            warn!(operation, error = %err, "deck query failed");
            T::default()
        })
    }

    pub fn categories(&self) -> Vec<CategorySummary> {
        self.absorb("categories", self.run(queries::categories))
    }

    pub fn questions_by_category(&self, category_id: i64) -> Vec<Question> {
        self.absorb(
            "questions_by_category",
            self.run(|gw| queries::questions_by_category(gw, category_id)),
        )
    }

    /// Returns `None` for an unknown id as well as on failure.
    pub fn question_detail(&self, id: i64) -> Option<QuestionDetail> {
        self.absorb("question_detail", self.run(|gw| queries::question_detail(gw, id)))
    }

    pub fn adjacent_question(
        &self,
        current_id: i64,
        category_id: i64,
        direction: Direction,
    ) -> Option<AdjacentQuestion> {
        self.absorb(
            "adjacent_question",
            self.run(|gw| queries::adjacent_question(gw, current_id, category_id, direction)),
        )
    }

    /// Marks a question learned now. Returns `false` for an unknown id.
    pub fn mark_learned(&self, id: i64) -> bool {
        self.mark_learned_at(id, Utc::now())
    }

    pub fn mark_learned_at(&self, id: i64, at: Timestamp) -> bool {
        self.absorb("mark_learned", self.run(|gw| queries::mark_learned(gw, id, at)))
    }

    pub fn cancel_learned(&self, id: i64) -> bool {
        self.absorb("cancel_learned", self.run(|gw| queries::cancel_learned(gw, id)))
    }

    /// Flips the favorite flag now. Returns `false` for an unknown id.
    pub fn toggle_favorite(&self, id: i64) -> bool {
        self.toggle_favorite_at(id, Utc::now())
    }

    pub fn toggle_favorite_at(&self, id: i64, at: Timestamp) -> bool {
        self.absorb("toggle_favorite", self.run(|gw| queries::toggle_favorite(gw, id, at)))
    }

    pub fn favorites(&self) -> Vec<QuestionDetail> {
        self.absorb("favorites", self.run(queries::favorites))
    }

    pub fn user_stats(&self) -> UserStats {
        self.absorb("user_stats", self.run(queries::user_stats))
    }

    /// Most recently learned questions; `None` means
    /// [`DEFAULT_RECENT_LIMIT`](crate::DEFAULT_RECENT_LIMIT).
    pub fn recent_questions(&self, limit: Option<usize>) -> Vec<QuestionDetail> {
        self.absorb(
            "recent_questions",
            self.run(|gw| queries::recent_questions(gw, limit)),
        )
    }

    pub fn category_progress(&self, category_id: i64) -> CategoryProgress {
        self.absorb(
            "category_progress",
            self.run(|gw| queries::category_progress(gw, category_id)),
        )
    }
}
