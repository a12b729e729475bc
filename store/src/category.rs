//! Category list and current-category selection.

use interview_deck_core::CategorySummary;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::StoreContext;
use crate::error::Result;

/// Storage key of the category snapshot.
pub const CATEGORY_STORAGE_KEY: &str = "deck_categories";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CategorySnapshot {
    categories: Vec<CategorySummary>,
    current_category: Option<CategorySummary>,
}

/// Holds the category list and the category the user is studying.
#[derive(Debug)]
pub struct CategoryStore {
    ctx: StoreContext,
    categories: Vec<CategorySummary>,
    current_category: Option<CategorySummary>,
    is_loading: bool,
}

impl CategoryStore {
    /// Creates the store, restoring the last snapshot if one exists.
    pub fn new(ctx: StoreContext) -> Self {
        let snapshot: CategorySnapshot = ctx.restore(CATEGORY_STORAGE_KEY).unwrap_or_default();
        Self {
            ctx,
            categories: snapshot.categories,
            current_category: snapshot.current_category,
            is_loading: false,
        }
    }

    pub fn categories(&self) -> &[CategorySummary] {
        &self.categories
    }

    pub fn current_category(&self) -> Option<&CategorySummary> {
        self.current_category.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Reloads the category list from the source.
    ///
    /// The current selection is refreshed from the new list; if there was
    /// none, or it no longer exists, the first category is selected.
    ///
    /// # Errors
    ///
    /// Returns the source error after notifying the user. The previous list
    /// is kept.
    pub fn fetch_categories(&mut self) -> Result<()> {
        self.is_loading = true;
        let result = self.ctx.source.categories();
        self.is_loading = false;

        let categories = result.map_err(|err| self.ctx.report("Failed to load categories", err))?;
        let current = self
            .current_category
            .as_ref()
            .and_then(|current| categories.iter().find(|c| c.id == current.id))
            .or_else(|| categories.first())
            .cloned();

        debug!(count = categories.len(), "fetched categories");
        self.categories = categories;
        self.current_category = current;
        self.save();
        Ok(())
    }

    /// Selects a category. Returns `false` if `id` is not in the list.
    pub fn switch_category(&mut self, id: i64) -> bool {
        let Some(category) = self.category_by_id(id).cloned() else {
            debug!(id, "switch to unknown category ignored");
            return false;
        };
        debug!(id, name = %category.name, "switched category");
        self.current_category = Some(category);
        self.save();
        true
    }

    pub fn category_by_id(&self, id: i64) -> Option<&CategorySummary> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Records a new completed count for a category.
    ///
    /// The count is capped at the category's question count. Returns `false`
    /// if `id` is not in the list.
    pub fn update_category_progress(&mut self, id: i64, completed: u32) -> bool {
        let Some(category) = self.categories.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        category.completed_count = completed.min(category.question_count);
        let updated = category.clone();

        if let Some(current) = self.current_category.as_mut().filter(|c| c.id == id) {
            *current = updated;
        }
        self.save();
        true
    }

    fn save(&self) {
        self.ctx.persist(
            CATEGORY_STORAGE_KEY,
            &CategorySnapshot {
                categories: self.categories.clone(),
                current_category: self.current_category.clone(),
            },
        );
    }
}
