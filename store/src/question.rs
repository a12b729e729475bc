//! Question list for one category and the study cursor over it.

use chrono::Utc;
use interview_deck_core::{Question, QuestionDetail};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::StoreContext;
use crate::error::{Result, StoreError};
use crate::source::{SourceResult, StudySource};

/// Storage key of the question snapshot.
pub const QUESTION_STORAGE_KEY: &str = "deck_questions";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct QuestionSnapshot {
    category_id: Option<i64>,
    questions: Vec<Question>,
    current_index: usize,
}

/// Holds the questions of the category being studied and a cursor.
///
/// The cursor always points into `questions` when the list is non-empty.
#[derive(Debug)]
pub struct QuestionStore {
    ctx: StoreContext,
    category_id: Option<i64>,
    questions: Vec<Question>,
    current_index: usize,
    is_loading: bool,
}

impl QuestionStore {
    /// Creates the store, restoring the last snapshot if one exists.
    pub fn new(ctx: StoreContext) -> Self {
        let snapshot: QuestionSnapshot = ctx.restore(QUESTION_STORAGE_KEY).unwrap_or_default();
        let current_index = if snapshot.current_index < snapshot.questions.len() {
            snapshot.current_index
        } else {
            0
        };
        Self {
            ctx,
            category_id: snapshot.category_id,
            questions: snapshot.questions,
            current_index,
            is_loading: false,
        }
    }

    pub fn category_id(&self) -> Option<i64> {
        self.category_id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn has_previous(&self) -> bool {
        self.current_index > 0
    }

    pub fn has_next(&self) -> bool {
        self.current_index + 1 < self.questions.len()
    }

    pub fn previous_question(&self) -> Option<&Question> {
        if self.has_previous() {
            self.questions.get(self.current_index - 1)
        } else {
            None
        }
    }

    pub fn next_question(&self) -> Option<&Question> {
        if self.has_next() {
            self.questions.get(self.current_index + 1)
        } else {
            None
        }
    }

    /// Loads a category's questions and puts the cursor on the first one.
    ///
    /// # Errors
    ///
    /// Returns the source error after notifying the user. The previous list
    /// and cursor are kept.
    pub fn load_questions(&mut self, category_id: i64) -> Result<()> {
        self.is_loading = true;
        let result = self.ctx.source.questions_by_category(category_id);
        self.is_loading = false;

        let questions = result.map_err(|err| self.ctx.report("Failed to load questions", err))?;
        debug!(category_id, count = questions.len(), "loaded questions");
        self.category_id = Some(category_id);
        self.questions = questions;
        self.current_index = 0;
        self.save();
        Ok(())
    }

    /// Fetches one question's detail.
    ///
    /// If the question is in the list, its entry is replaced with the fresh
    /// copy and the cursor moves to it.
    ///
    /// # Errors
    ///
    /// Returns the source error after notifying the user.
    pub fn load_question_detail(&mut self, id: i64) -> Result<Option<QuestionDetail>> {
        self.is_loading = true;
        let result = self.ctx.source.question_detail(id);
        self.is_loading = false;

        let detail =
            result.map_err(|err| self.ctx.report("Failed to load question detail", err))?;
        if let Some(detail) = &detail {
            if let Some(index) = self.position(id) {
                self.questions[index] = detail.question.clone();
                self.current_index = index;
                self.save();
            }
        }
        Ok(detail)
    }

    /// Moves the cursor back one question. Returns `false` at the start.
    pub fn go_to_previous(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.current_index -= 1;
        self.log_cursor();
        true
    }

    /// Moves the cursor forward one question. Returns `false` at the end.
    pub fn go_to_next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.current_index += 1;
        self.log_cursor();
        true
    }

    /// Flips a question's favorite flag and returns the stored value.
    ///
    /// The question is re-read after the write, so the result and any loaded
    /// copy match the source even when the list was stale or does not hold
    /// `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the source has no such question,
    /// or the source error. Either way the user is notified and local state
    /// is unchanged.
    pub fn toggle_favorite(&mut self, id: i64) -> Result<bool> {
        const MESSAGE: &str = "Failed to update favorite";
        let now = Utc::now();
        self.write(MESSAGE, id, |source| source.toggle_favorite(id, now))?;

        let question = self
            .ctx
            .source
            .question_detail(id)
            .map_err(|err| self.ctx.report(MESSAGE, err))?
            .ok_or_else(|| self.ctx.report(MESSAGE, StoreError::NotFound(id)))?
            .question;

        let favorite = question.is_favorite;
        if let Some(index) = self.position(id) {
            self.questions[index] = question;
        }
        debug!(id, favorite, "toggled favorite");
        self.save();
        Ok(favorite)
    }

    /// Marks a question learned.
    ///
    /// # Errors
    ///
    /// Same as [`toggle_favorite`](Self::toggle_favorite).
    pub fn mark_learned(&mut self, id: i64) -> Result<()> {
        let now = Utc::now();
        self.write("Failed to update progress", id, |source| source.mark_learned(id, now))?;
        if let Some(question) = self.position(id).map(|index| &mut self.questions[index]) {
            if !question.is_learned {
                question.set_learned(true, now);
            }
        }
        self.save();
        Ok(())
    }

    /// Clears a question's learned flag.
    ///
    /// # Errors
    ///
    /// Same as [`toggle_favorite`](Self::toggle_favorite).
    pub fn cancel_learned(&mut self, id: i64) -> Result<()> {
        self.write("Failed to update progress", id, |source| source.cancel_learned(id))?;
        if let Some(index) = self.position(id) {
            self.questions[index].clear_learned();
        }
        self.save();
        Ok(())
    }

    fn write(
        &self,
        message: &str,
        id: i64,
        call: impl FnOnce(&dyn StudySource) -> SourceResult<bool>,
    ) -> Result<()> {
        match call(self.ctx.source.as_ref()) {
            Ok(true) => Ok(()),
            Ok(false) => Err(self.ctx.report(message, StoreError::NotFound(id))),
            Err(err) => Err(self.ctx.report(message, err)),
        }
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }

    fn log_cursor(&self) {
        if let Some(question) = self.current_question() {
            debug!(index = self.current_index, title = %question.title, "moved cursor");
        }
    }

    fn save(&self) {
        self.ctx.persist(
            QUESTION_STORAGE_KEY,
            &QuestionSnapshot {
                category_id: self.category_id,
                questions: self.questions.clone(),
                current_index: self.current_index,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    fn loaded(fx: &Fixture) -> QuestionStore {
        let mut store = QuestionStore::new(fx.context());
        store.load_questions(1).unwrap();
        store
    }

    #[test]
    fn test_load_questions_resets_cursor() {
        let fx = Fixture::new();
        let mut store = loaded(&fx);
        store.go_to_next();
        store.load_questions(1).unwrap();
        assert_eq!(store.current_index(), 0);
        assert_eq!(store.current_question().unwrap().id, 1);
        assert_eq!(store.category_id(), Some(1));
    }

    #[test]
    fn test_cursor_bounds() {
        let fx = Fixture::new();
        let mut store = loaded(&fx);
        assert!(!store.has_previous());
        assert!(store.previous_question().is_none());
        assert!(!store.go_to_previous());

        assert!(store.go_to_next());
        assert!(store.go_to_next());
        assert!(!store.has_next());
        assert!(store.next_question().is_none());
        assert!(!store.go_to_next());
        assert_eq!(store.current_question().unwrap().id, 3);
        assert_eq!(store.previous_question().unwrap().id, 2);
    }

    #[test]
    fn test_empty_category() {
        let fx = Fixture::new();
        let mut store = QuestionStore::new(fx.context());
        store.load_questions(2).unwrap();
        assert!(store.current_question().is_none());
        assert!(!store.has_next());
        assert!(!store.go_to_next());
    }

    #[test]
    fn test_load_detail_replaces_entry_and_moves_cursor() {
        let fx = Fixture::new();
        let mut store = loaded(&fx);
        fx.source.mark_learned(3, Utc::now()).unwrap();

        let detail = store.load_question_detail(3).unwrap().unwrap();
        assert_eq!(detail.category_name.as_deref(), Some("Java"));
        assert_eq!(store.current_index(), 2);
        assert!(store.current_question().unwrap().is_learned);
    }

    #[test]
    fn test_load_detail_unknown_id() {
        let fx = Fixture::new();
        let mut store = loaded(&fx);
        assert!(store.load_question_detail(99).unwrap().is_none());
        assert_eq!(store.current_index(), 0);
    }

    #[test]
    fn test_toggle_favorite_updates_local_copy() {
        let fx = Fixture::new();
        let mut store = loaded(&fx);
        assert!(store.toggle_favorite(2).unwrap());
        assert!(store.questions()[1].is_favorite);
        assert!(store.questions()[1].favorite_time.is_some());

        assert!(!store.toggle_favorite(2).unwrap());
        assert!(store.questions()[1].favorite_time.is_none());
    }

    #[test]
    fn test_toggle_favorite_outside_loaded_category() {
        let fx = Fixture::new();
        let mut store = QuestionStore::new(fx.context());
        store.load_questions(2).unwrap();
        assert!(store.questions().is_empty());

        assert!(store.toggle_favorite(3).unwrap());
        assert!(fx.source.question_detail(3).unwrap().unwrap().question.is_favorite);
        assert!(!store.toggle_favorite(3).unwrap());
    }

    #[test]
    fn test_toggle_favorite_refreshes_stale_copy() {
        let fx = Fixture::new();
        let mut store = loaded(&fx);
        fx.source.toggle_favorite(1, Utc::now()).unwrap();
        assert!(!store.questions()[0].is_favorite);

        assert!(!store.toggle_favorite(1).unwrap());
        let stored = fx.source.question_detail(1).unwrap().unwrap().question;
        assert!(!stored.is_favorite);
        assert_eq!(store.questions()[0], stored);
    }

    #[test]
    fn test_mark_and_cancel_learned() {
        let fx = Fixture::new();
        let mut store = loaded(&fx);
        store.mark_learned(1).unwrap();
        assert!(store.questions()[0].is_learned);

        store.cancel_learned(1).unwrap();
        assert!(!store.questions()[0].is_learned);
        assert!(store.questions()[0].learn_time.is_none());
    }

    #[test]
    fn test_write_failure_leaves_state() {
        let fx = Fixture::new();
        let mut store = loaded(&fx);
        fx.source.set_failing(true);

        assert!(store.mark_learned(1).is_err());
        assert!(!store.questions()[0].is_learned);
        assert!(store.toggle_favorite(1).is_err());
        assert!(!store.questions()[0].is_favorite);
        assert_eq!(
            fx.notifier.messages(),
            vec!["Failed to update progress", "Failed to update favorite"]
        );
    }

    #[test]
    fn test_write_unknown_id_is_not_found() {
        let fx = Fixture::new();
        let mut store = loaded(&fx);
        assert!(matches!(store.mark_learned(99), Err(StoreError::NotFound(99))));
    }

    #[test]
    fn test_load_failure_keeps_previous_list() {
        let fx = Fixture::new();
        let mut store = loaded(&fx);
        store.go_to_next();
        fx.source.set_failing(true);

        assert!(store.load_questions(2).is_err());
        assert_eq!(store.questions().len(), 3);
        assert_eq!(store.current_index(), 1);
        assert!(!store.is_loading());
        assert_eq!(fx.notifier.take(), vec!["Failed to load questions"]);
    }

    #[test]
    fn test_snapshot_restores_cursor() {
        let fx = Fixture::new();
        {
            let mut store = loaded(&fx);
            store.load_question_detail(2).unwrap();
        }
        let store = QuestionStore::new(fx.context());
        assert_eq!(store.questions().len(), 3);
        assert_eq!(store.current_index(), 1);
    }
}
