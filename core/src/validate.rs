//! Seed package validation.
//!
//! Checks the structural invariants a seed must satisfy before it is
//! imported: unique ids, non-empty names and titles, parseable timestamps,
//! questions pointing at a known category, and `sort_order` unique within
//! each category. Catching these up front turns a half-applied import into a
//! clear error list.
//!
//! # Examples
//!
//! ```
//! use interview_deck_core::*;
//!
//! let mut package = SeedPackage::new("1.0.0", "2024-01-01T00:00:00Z");
//! package.categories.push(SeedCategory {
//!     id: 1,
//!     name: "JVM".into(),
//!     create_time: "2024-01-01 00:00:00".into(),
//! });
//! assert!(validate_seed(&package).is_empty());
//!
//! // A question pointing at a missing category is rejected
//! package.questions.push(SeedQuestion {
//!     id: 1,
//!     category_id: 9,
//!     uri: "https://example.com/1".into(),
//!     title: "What is the heap?".into(),
//!     answer: None,
//!     sort_order: 1,
//!     create_time: "2024-01-01 00:00:00".into(),
//! });
//! assert!(!validate_seed(&package).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::SeedPackage;
use crate::time::parse_timestamp;

/// Seed validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Package version string is empty.
    #[error("package version cannot be empty")]
    EmptyPackageVersion,
    /// Two categories share an id.
    #[error("duplicate category id: {0}")]
    DuplicateCategory(i64),
    /// Category name is empty or whitespace-only.
    #[error("category {0} has an empty name")]
    EmptyCategoryName(i64),
    /// Two questions share an id.
    #[error("duplicate question id: {0}")]
    DuplicateQuestion(i64),
    /// Question title is empty or whitespace-only.
    #[error("question {0} has an empty title")]
    EmptyTitle(i64),
    /// Question references a category that is not in the package.
    #[error("question {question_id} references unknown category {category_id}")]
    UnknownCategory { question_id: i64, category_id: i64 },
    /// Two questions in the same category share a sort order.
    #[error("duplicate sort order {sort_order} in category {category_id}")]
    DuplicateSortOrder { category_id: i64, sort_order: i64 },
    /// A `createTime` value could not be parsed.
    #[error("{entity} {id} has an unparseable create time: '{value}'")]
    InvalidTimestamp {
        entity: &'static str,
        id: i64,
        value: String,
    },
}

/// Validates a seed package, returning every problem found.
///
/// An empty result means the package can be imported as-is.
pub fn validate_seed(package: &SeedPackage) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if package.version.trim().is_empty() {
        errors.push(ValidationError::EmptyPackageVersion);
    }

    let mut category_ids: HashSet<i64> = HashSet::new();
    for category in &package.categories {
        if !category_ids.insert(category.id) {
            errors.push(ValidationError::DuplicateCategory(category.id));
        }
        if category.name.trim().is_empty() {
            errors.push(ValidationError::EmptyCategoryName(category.id));
        }
        if parse_timestamp(&category.create_time).is_none() {
            errors.push(ValidationError::InvalidTimestamp {
                entity: "category",
                id: category.id,
                value: category.create_time.clone(),
            });
        }
    }

    let mut question_ids: HashSet<i64> = HashSet::new();
    let mut orders: HashSet<(i64, i64)> = HashSet::new();
    for question in &package.questions {
        if !question_ids.insert(question.id) {
            errors.push(ValidationError::DuplicateQuestion(question.id));
        }
        if question.title.trim().is_empty() {
            errors.push(ValidationError::EmptyTitle(question.id));
        }
        if !category_ids.contains(&question.category_id) {
            errors.push(ValidationError::UnknownCategory {
                question_id: question.id,
                category_id: question.category_id,
            });
        }
        if !orders.insert((question.category_id, question.sort_order)) {
            errors.push(ValidationError::DuplicateSortOrder {
                category_id: question.category_id,
                sort_order: question.sort_order,
            });
        }
        if parse_timestamp(&question.create_time).is_none() {
            errors.push(ValidationError::InvalidTimestamp {
                entity: "question",
                id: question.id,
                value: question.create_time.clone(),
            });
        }
    }

    errors
}
