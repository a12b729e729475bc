//! Study statistics, favorites, and the recently-studied list.

use chrono::Utc;
use interview_deck_core::{QuestionDetail, Timestamp, UserStats};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::StoreContext;
use crate::error::{Result, StoreError};

/// Storage key of the user snapshot.
pub const USER_STORAGE_KEY: &str = "deck_user_data";

/// Default bound on the recently-studied list.
pub const DEFAULT_RECENT_CAPACITY: usize = 20;

/// Deck totals plus when the user last studied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
    #[serde(flatten)]
    pub totals: UserStats,
    pub last_study_time: Option<Timestamp>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UserSnapshot {
    stats: StudyStats,
    favorites: Vec<QuestionDetail>,
    recent_questions: Vec<QuestionDetail>,
}

/// Holds the user's statistics, favorites, and recently studied questions.
///
/// The recent list is most-recent first and never longer than its capacity.
#[derive(Debug)]
pub struct UserStore {
    ctx: StoreContext,
    stats: StudyStats,
    favorites: Vec<QuestionDetail>,
    recent_questions: Vec<QuestionDetail>,
    recent_capacity: usize,
    is_loading: bool,
}

impl UserStore {
    /// Creates the store with [`DEFAULT_RECENT_CAPACITY`], restoring the
    /// last snapshot if one exists.
    pub fn new(ctx: StoreContext) -> Self {
        Self::with_capacity(ctx, DEFAULT_RECENT_CAPACITY)
    }

    pub fn with_capacity(ctx: StoreContext, recent_capacity: usize) -> Self {
        let mut snapshot: UserSnapshot = ctx.restore(USER_STORAGE_KEY).unwrap_or_default();
        snapshot.recent_questions.truncate(recent_capacity);
        Self {
            ctx,
            stats: snapshot.stats,
            favorites: snapshot.favorites,
            recent_questions: snapshot.recent_questions,
            recent_capacity,
            is_loading: false,
        }
    }

    pub fn stats(&self) -> &StudyStats {
        &self.stats
    }

    pub fn favorites(&self) -> &[QuestionDetail] {
        &self.favorites
    }

    /// Ids of the favorite questions, newest first.
    pub fn favorite_ids(&self) -> Vec<i64> {
        self.favorites.iter().map(|d| d.question.id).collect()
    }

    pub fn recent_questions(&self) -> &[QuestionDetail] {
        &self.recent_questions
    }

    pub fn recent_capacity(&self) -> usize {
        self.recent_capacity
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Learned share of all questions, as a percentage.
    pub fn completion_rate(&self) -> f64 {
        self.stats.totals.completion_rate()
    }

    /// Reloads the deck totals. `last_study_time` is kept.
    ///
    /// # Errors
    ///
    /// Returns the source error after notifying the user.
    pub fn fetch_user_stats(&mut self) -> Result<()> {
        self.is_loading = true;
        let result = self.ctx.source.user_stats();
        self.is_loading = false;

        self.stats.totals =
            result.map_err(|err| self.ctx.report("Failed to load statistics", err))?;
        self.save();
        Ok(())
    }

    /// Reloads the favorite list and syncs the favorite count to it.
    ///
    /// # Errors
    ///
    /// Returns the source error after notifying the user.
    pub fn fetch_favorites(&mut self) -> Result<()> {
        self.is_loading = true;
        let result = self.ctx.source.favorites();
        self.is_loading = false;

        let favorites = result.map_err(|err| self.ctx.report("Failed to load favorites", err))?;
        self.stats.totals.favorites = u32::try_from(favorites.len()).unwrap_or(u32::MAX);
        self.favorites = favorites;
        self.save();
        Ok(())
    }

    /// Reloads the recent list from learned questions.
    ///
    /// `limit` defaults to the query library's default and is capped at the
    /// store's capacity.
    ///
    /// # Errors
    ///
    /// Returns the source error after notifying the user.
    pub fn fetch_recent_questions(&mut self, limit: Option<usize>) -> Result<()> {
        let limit = limit.map(|l| l.min(self.recent_capacity));
        self.is_loading = true;
        let result = self.ctx.source.recent_questions(limit);
        self.is_loading = false;

        let mut recent =
            result.map_err(|err| self.ctx.report("Failed to load study history", err))?;
        recent.truncate(self.recent_capacity);
        self.recent_questions = recent;
        self.save();
        Ok(())
    }

    /// Flips a question's favorite flag and returns the new value.
    ///
    /// The favorite list moves with the flag; the favorite count is re-read
    /// from the source.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the source has no such question,
    /// or the source error. Either way the user is notified.
    pub fn toggle_favorite(&mut self, id: i64) -> Result<bool> {
        const MESSAGE: &str = "Failed to update favorite";
        let toggled = self
            .ctx
            .source
            .toggle_favorite(id, Utc::now())
            .map_err(|err| self.ctx.report(MESSAGE, err))?;
        if !toggled {
            return Err(self.ctx.report(MESSAGE, StoreError::NotFound(id)));
        }

        let detail = self
            .ctx
            .source
            .question_detail(id)
            .map_err(|err| self.ctx.report(MESSAGE, err))?
            .ok_or_else(|| self.ctx.report(MESSAGE, StoreError::NotFound(id)))?;

        let totals = self
            .ctx
            .source
            .user_stats()
            .map_err(|err| self.ctx.report(MESSAGE, err))?;

        let favorite = detail.question.is_favorite;
        self.favorites.retain(|d| d.question.id != id);
        if favorite {
            self.favorites.insert(0, detail);
        }
        self.stats.totals = totals;
        debug!(id, favorite, "toggled favorite");
        self.save();
        Ok(favorite)
    }

    /// Records that the user studied `question` now.
    ///
    /// An entry already in the list moves to the front; the oldest entry is
    /// dropped once the list exceeds its capacity.
    pub fn add_recent_question(&mut self, question: QuestionDetail) {
        self.add_recent_question_at(question, Utc::now());
    }

    pub fn add_recent_question_at(&mut self, question: QuestionDetail, at: Timestamp) {
        let id = question.question.id;
        self.recent_questions.retain(|d| d.question.id != id);
        self.recent_questions.insert(0, question);
        self.recent_questions.truncate(self.recent_capacity);
        self.stats.last_study_time = Some(at);
        debug!(id, len = self.recent_questions.len(), "recorded recent question");
        self.save();
    }

    fn save(&self) {
        self.ctx.persist(
            USER_STORAGE_KEY,
            &UserSnapshot {
                stats: self.stats,
                favorites: self.favorites.clone(),
                recent_questions: self.recent_questions.clone(),
            },
        );
    }
}
