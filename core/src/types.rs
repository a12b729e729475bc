//! Domain type definitions for the question deck.
//!
//! This module defines the records every layer of the workspace passes
//! around: stored entities ([`Category`], [`Question`]) and the read models
//! built from them by the query library ([`CategorySummary`],
//! [`QuestionDetail`], [`AdjacentQuestion`], [`UserStats`],
//! [`CategoryProgress`]). All types serialize to camelCase JSON so snapshots
//! and seed files share one vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// A topic grouping of questions.
///
/// Categories are seeded when the schema is created and are not modified
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Stable identifier.
    pub id: i64,
    /// Display name, never empty.
    pub name: String,
    /// When the category was created.
    pub create_time: Timestamp,
}

/// A single study item with its learned/favorite state.
///
/// The learned and favorite flags each carry a timestamp that is present
/// exactly when the flag is set. Use [`set_learned`](Question::set_learned)
/// and [`set_favorite`](Question::set_favorite) to change them together.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use interview_deck_core::Question;
///
/// let mut q = Question::new(7, 1, "What is a HashMap?", 10, Utc::now());
/// assert!(!q.is_learned);
///
/// q.set_learned(true, Utc::now());
/// assert!(q.learn_time.is_some());
///
/// q.clear_learned();
/// assert!(q.learn_time.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique identifier.
    pub id: i64,
    /// Owning category.
    pub category_id: i64,
    /// External reference link for the question source.
    pub uri: String,
    /// Question title as shown in lists.
    pub title: String,
    /// Position within the category; unique per category.
    pub sort_order: i64,
    /// Answer text, if the seed provided one.
    pub answer: Option<String>,
    /// Whether the user has studied this question.
    pub is_learned: bool,
    /// Set when `is_learned` became true.
    pub learn_time: Option<Timestamp>,
    /// Whether the user bookmarked this question.
    pub is_favorite: bool,
    /// Set when `is_favorite` became true.
    pub favorite_time: Option<Timestamp>,
    /// When the question was created.
    pub create_time: Timestamp,
}

impl Question {
    /// Creates an unlearned, non-favorite question with an empty uri.
    pub fn new(
        id: i64,
        category_id: i64,
        title: impl Into<String>,
        sort_order: i64,
        create_time: Timestamp,
    ) -> Self {
        Self {
            id,
            category_id,
            uri: String::new(),
            title: title.into(),
            sort_order,
            answer: None,
            is_learned: false,
            learn_time: None,
            is_favorite: false,
            favorite_time: None,
            create_time,
        }
    }

    /// Sets the external reference link.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    /// Sets the answer text.
    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    /// Sets the learned flag, stamping or clearing `learn_time` with it.
    pub fn set_learned(&mut self, learned: bool, at: Timestamp) {
        self.is_learned = learned;
        self.learn_time = learned.then_some(at);
    }

    /// Clears the learned flag and its timestamp.
    pub fn clear_learned(&mut self) {
        self.is_learned = false;
        self.learn_time = None;
    }

    /// Sets the favorite flag, stamping or clearing `favorite_time` with it.
    pub fn set_favorite(&mut self, favorite: bool, at: Timestamp) {
        self.is_favorite = favorite;
        self.favorite_time = favorite.then_some(at);
    }

    /// Flips the favorite flag and returns the new value.
    pub fn toggle_favorite(&mut self, at: Timestamp) -> bool {
        let next = !self.is_favorite;
        self.set_favorite(next, at);
        next
    }
}

/// A category together with its completion counts.
///
/// The counts are computed from question rows at query time and never
/// stored, so `completed_count <= question_count` always holds for values
/// produced by the query library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub create_time: Timestamp,
    /// Number of questions in the category.
    pub question_count: u32,
    /// Number of learned questions in the category.
    pub completed_count: u32,
}

impl CategorySummary {
    /// Fraction of learned questions in `0.0..=1.0`; zero for an empty category.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use interview_deck_core::CategorySummary;
    ///
    /// let summary = CategorySummary {
    ///     id: 1,
    ///     name: "Collections".into(),
    ///     create_time: Utc::now(),
    ///     question_count: 4,
    ///     completed_count: 1,
    /// };
    /// assert_eq!(summary.completion_ratio(), 0.25);
    /// ```
    pub fn completion_ratio(&self) -> f64 {
        if self.question_count == 0 {
            return 0.0;
        }
        f64::from(self.completed_count) / f64::from(self.question_count)
    }

    /// Number of questions not yet learned.
    pub fn remaining(&self) -> u32 {
        self.question_count.saturating_sub(self.completed_count)
    }
}

/// A question joined with its category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: Question,
    /// `None` if the category row is missing.
    pub category_name: Option<String>,
}

/// The neighbour of a question in sort order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjacentQuestion {
    pub id: i64,
    pub title: String,
    pub sort_order: i64,
}

/// Deck-wide counters shown on the profile view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// Total number of questions.
    pub total: u32,
    /// Number of learned questions.
    pub completed: u32,
    /// Number of favorited questions.
    pub favorites: u32,
}

impl UserStats {
    /// Completion as a percentage in `0.0..=100.0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use interview_deck_core::UserStats;
    ///
    /// assert_eq!(UserStats::default().completion_rate(), 0.0);
    ///
    /// let stats = UserStats { total: 8, completed: 2, favorites: 1 };
    /// assert_eq!(stats.completion_rate(), 25.0);
    /// ```
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.completed) / f64::from(self.total) * 100.0
    }
}

/// Total and learned counts scoped to one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProgress {
    pub total: u32,
    pub completed: u32,
}

/// Direction for adjacent-question lookup.
///
/// # Examples
///
/// ```
/// use interview_deck_core::Direction;
///
/// let dir: Direction = "prev".parse().unwrap();
/// assert_eq!(dir, Direction::Prev);
/// assert_eq!(dir.reverse(), Direction::Next);
/// assert!("sideways".parse::<Direction>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Next-lower `sort_order`.
    Prev,
    /// Next-higher `sort_order`.
    Next,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Prev => "prev",
            Direction::Next => "next",
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Direction::Prev => Direction::Next,
            Direction::Next => Direction::Prev,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`Direction`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction '{0}': expected 'prev' or 'next'")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prev" | "previous" => Ok(Direction::Prev),
            "next" => Ok(Direction::Next),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}
