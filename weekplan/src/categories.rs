//! Ordered category list with soft references from tasks.

use weekplan_model::{Category, CategoryDraft, CategoryId};

/// Errors that can occur during category operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CategoryError {
    /// Category name cannot be empty.
    #[error("category name cannot be empty")]
    NameEmpty,
    /// No category has the given id.
    #[error("category not found: {0}")]
    NotFound(String),
}

/// Owns the category list.
///
/// Deleting a category does not touch tasks; [`resolve`](Self::resolve)
/// maps dangling ids to a fallback at read time.
#[derive(Debug, Clone, Default)]
pub struct CategoryStore {
    categories: Vec<Category>,
}

impl CategoryStore {
    #[must_use]
    pub const fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    #[must_use]
    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn get(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == *id)
    }

    /// The category `id`, else the first category, else
    /// [`Category::uncategorized`].
    #[must_use]
    pub fn resolve(&self, id: &CategoryId) -> Category {
        self.get(id)
            .or_else(|| self.categories.first())
            .cloned()
            .unwrap_or_else(Category::uncategorized)
    }

    /// Appends a category with a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns [`CategoryError::NameEmpty`] if the trimmed name is empty.
    pub fn add(&mut self, draft: CategoryDraft) -> Result<Category, CategoryError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(CategoryError::NameEmpty);
        }
        let category = Category {
            id: CategoryId::generate(),
            name: name.to_string(),
            color: draft.color,
            icon: draft.icon,
        };
        self.categories.push(category.clone());
        tracing::debug!(category_id = %category.id, name = %category.name, "category added");
        Ok(category)
    }

    /// Removes a category by id. Tasks keep their reference.
    ///
    /// # Errors
    ///
    /// Returns [`CategoryError::NotFound`] for an unknown id.
    pub fn delete(&mut self, id: &CategoryId) -> Result<Category, CategoryError> {
        let pos = self
            .categories
            .iter()
            .position(|c| c.id == *id)
            .ok_or_else(|| CategoryError::NotFound(id.to_string()))?;
        Ok(self.categories.remove(pos))
    }

    /// Swaps in a whole new list, e.g. after an import.
    pub fn replace(&mut self, categories: Vec<Category>) -> Vec<Category> {
        std::mem::replace(&mut self.categories, categories)
    }
}
