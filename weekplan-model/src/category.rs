//! Task categories.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category identifier. Built-in categories use readable slugs
/// (`"work"`); user-created ones get a generated token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(String);

impl CategoryId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh unique token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    /// Return the string representation of this category ID.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A named, colored grouping for tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Display color, `#rrggbb`.
    pub color: String,
    /// Display icon token.
    pub icon: String,
}

/// Default color for user-created categories without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#007bff";
/// Default icon for user-created categories without one.
pub const DEFAULT_CATEGORY_ICON: &str = "bx bx-folder";

impl Category {
    fn builtin(id: &str, name: &str, color: &str, icon: &str) -> Self {
        Self {
            id: CategoryId::new(id),
            name: name.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
        }
    }

    /// The six categories seeded when nothing has been persisted yet.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::builtin("work", "Work", "#28a745", "bx bx-briefcase"),
            Self::builtin("personal", "Personal", "#007bff", "bx bx-home"),
            Self::builtin("shopping", "Shopping", "#ffc107", "bx bx-shopping-bag"),
            Self::builtin("health", "Health", "#17a2b8", "bx bx-heart"),
            Self::builtin("study", "Study", "#6f42c1", "bx bx-book"),
            Self::builtin("family", "Family", "#e83e8c", "bx bx-group"),
        ]
    }

    /// Stand-in used when a task points at a category that no longer
    /// exists and the category list is empty.
    #[must_use]
    pub fn uncategorized() -> Self {
        Self::builtin("uncategorized", "Uncategorized", "#6c757d", "bx bx-purchase-tag")
    }
}

/// User input for a new category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub color: String,
    pub icon: String,
}

impl CategoryDraft {
    /// A draft with the default color and icon.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: DEFAULT_CATEGORY_COLOR.to_string(),
            icon: DEFAULT_CATEGORY_ICON.to_string(),
        }
    }
}
