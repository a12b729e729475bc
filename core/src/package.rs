use serde::{Deserialize, Serialize};

/// A category record as shipped in seed data.
///
/// `create_time` stays as text here; it is checked by
/// [`validate_seed`](crate::validate_seed) and parsed on import, because seed
/// files use several timestamp layouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedCategory {
    pub id: i64,
    pub name: String,
    pub create_time: String,
}

/// A question record as shipped in seed data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedQuestion {
    pub id: i64,
    pub category_id: i64,
    pub uri: String,
    pub title: String,
    #[serde(default)]
    pub answer: Option<String>,
    pub sort_order: i64,
    pub create_time: String,
}

/// Serializable seed bundle used to populate a fresh database.
///
/// A package groups the reference categories and their questions with
/// version metadata, so a whole deck can be shipped as one JSON file.
///
/// # Examples
///
/// ```
/// use interview_deck_core::*;
///
/// let mut package = SeedPackage::new("1.0.0", "2024-01-15T10:30:00Z");
/// package.categories.push(SeedCategory {
///     id: 1,
///     name: "Collections".into(),
///     create_time: "2024-01-15 10:30:00".into(),
/// });
/// package.questions.push(SeedQuestion {
///     id: 1,
///     category_id: 1,
///     uri: "https://example.com/q/1".into(),
///     title: "How does HashMap resize?".into(),
///     answer: None,
///     sort_order: 10,
///     create_time: "2024-01-15 10:30:00".into(),
/// });
///
/// assert_eq!(package.category_count(), 1);
/// assert_eq!(package.questions_in(1).count(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedPackage {
    /// Package format version (semver string).
    pub version: String,
    /// Optional deck name.
    #[serde(default)]
    pub name: Option<String>,
    /// Optional deck description.
    #[serde(default)]
    pub description: Option<String>,
    /// ISO-8601 timestamp for package creation.
    #[serde(default)]
    pub generated_at: String,
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
    #[serde(default)]
    pub questions: Vec<SeedQuestion>,
}

impl SeedPackage {
    /// Creates an empty package with required fields.
    pub fn new(version: impl Into<String>, generated_at: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            generated_at: generated_at.into(),
            ..Default::default()
        }
    }

    /// Returns the number of categories in this package.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Returns the number of questions in this package.
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Returns `true` if the package carries no records at all.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.questions.is_empty()
    }

    /// Iterates the questions belonging to `category_id`, in file order.
    pub fn questions_in(&self, category_id: i64) -> impl Iterator<Item = &SeedQuestion> {
        self.questions
            .iter()
            .filter(move |q| q.category_id == category_id)
    }
}
