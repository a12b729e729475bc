//! In-memory study source for container tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use interview_deck_core::{
    CategorySummary, Question, QuestionDetail, Timestamp, UserStats,
};

use crate::context::StoreContext;
use crate::error::SourceError;
use crate::notify::RecordingNotifier;
use crate::source::{SourceResult, StudySource};
use crate::storage::MemoryStorage;

pub(crate) struct FakeSource {
    categories: Vec<(i64, String)>,
    questions: Mutex<Vec<Question>>,
    failing: AtomicBool,
}

pub(crate) fn created() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

impl FakeSource {
    /// Category 1 holds questions 1..=3 at sort orders 10, 20, 30; category 2
    /// is empty.
    pub(crate) fn sample() -> Self {
        let questions = (1..=3)
            .map(|id| {
                Question::new(id, 1, format!("Question {id}"), id * 10, created())
                    .with_answer(format!("Answer {id}"))
            })
            .collect();
        Self {
            categories: vec![(1, "Java".to_string()), (2, "Spring".to_string())],
            questions: Mutex::new(questions),
            failing: AtomicBool::new(false),
        }
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self, operation: &'static str) -> SourceResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::new(operation, "database is locked"));
        }
        Ok(())
    }

    fn detail(&self, question: &Question) -> QuestionDetail {
        QuestionDetail {
            question: question.clone(),
            category_name: self
                .categories
                .iter()
                .find(|(id, _)| *id == question.category_id)
                .map(|(_, name)| name.clone()),
        }
    }

    fn update(&self, id: i64, f: impl FnOnce(&mut Question)) -> bool {
        let mut questions = self.questions.lock().unwrap();
        match questions.iter_mut().find(|q| q.id == id) {
            Some(question) => {
                f(question);
                true
            }
            None => false,
        }
    }
}

impl StudySource for FakeSource {
    fn categories(&self) -> SourceResult<Vec<CategorySummary>> {
        self.check("categories")?;
        let questions = self.questions.lock().unwrap();
        Ok(self
            .categories
            .iter()
            .map(|(id, name)| {
                let in_category = questions.iter().filter(|q| q.category_id == *id);
                CategorySummary {
                    id: *id,
                    name: name.clone(),
                    create_time: created(),
                    question_count: in_category.clone().count() as u32,
                    completed_count: in_category.filter(|q| q.is_learned).count() as u32,
                }
            })
            .collect())
    }

    fn questions_by_category(&self, category_id: i64) -> SourceResult<Vec<Question>> {
        self.check("questions_by_category")?;
        let mut questions: Vec<Question> = self
            .questions
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.category_id == category_id)
            .cloned()
            .collect();
        questions.sort_by_key(|q| q.sort_order);
        Ok(questions)
    }

    fn question_detail(&self, id: i64) -> SourceResult<Option<QuestionDetail>> {
        self.check("question_detail")?;
        let questions = self.questions.lock().unwrap();
        Ok(questions.iter().find(|q| q.id == id).map(|q| self.detail(q)))
    }

    fn mark_learned(&self, id: i64, at: Timestamp) -> SourceResult<bool> {
        self.check("mark_learned")?;
        Ok(self.update(id, |q| {
            if !q.is_learned {
                q.set_learned(true, at);
            }
        }))
    }

    fn cancel_learned(&self, id: i64) -> SourceResult<bool> {
        self.check("cancel_learned")?;
        Ok(self.update(id, Question::clear_learned))
    }

    fn toggle_favorite(&self, id: i64, at: Timestamp) -> SourceResult<bool> {
        self.check("toggle_favorite")?;
        Ok(self.update(id, |q| {
            q.toggle_favorite(at);
        }))
    }

    fn favorites(&self) -> SourceResult<Vec<QuestionDetail>> {
        self.check("favorites")?;
        let questions = self.questions.lock().unwrap();
        let mut favorites: Vec<&Question> = questions.iter().filter(|q| q.is_favorite).collect();
        favorites.sort_by(|a, b| b.favorite_time.cmp(&a.favorite_time));
        Ok(favorites.into_iter().map(|q| self.detail(q)).collect())
    }

    fn user_stats(&self) -> SourceResult<UserStats> {
        self.check("user_stats")?;
        let questions = self.questions.lock().unwrap();
        Ok(UserStats {
            total: questions.len() as u32,
            completed: questions.iter().filter(|q| q.is_learned).count() as u32,
            favorites: questions.iter().filter(|q| q.is_favorite).count() as u32,
        })
    }

    fn recent_questions(&self, limit: Option<usize>) -> SourceResult<Vec<QuestionDetail>> {
        self.check("recent_questions")?;
        let questions = self.questions.lock().unwrap();
        let mut learned: Vec<&Question> = questions.iter().filter(|q| q.is_learned).collect();
        learned.sort_by(|a, b| b.learn_time.cmp(&a.learn_time));
        Ok(learned
            .into_iter()
            .take(limit.unwrap_or(5))
            .map(|q| self.detail(q))
            .collect())
    }
}

pub(crate) struct Fixture {
    pub source: Arc<FakeSource>,
    pub storage: Arc<MemoryStorage>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self {
            source: Arc::new(FakeSource::sample()),
            storage: Arc::new(MemoryStorage::new()),
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }

    pub(crate) fn context(&self) -> StoreContext {
        StoreContext::new(
            self.source.clone(),
            self.storage.clone(),
            self.notifier.clone(),
        )
    }
}
