//! Day-bucketed task management.
//!
//! [`TaskStore`] owns the week's tasks and applies the mutations;
//! [`recurrence`] decides where recurring clones go and [`view`] derives
//! the filtered lists and statistics the front end displays.

pub mod recurrence;
pub mod store;
pub mod view;

pub use store::TaskStore;
pub use view::{DayCounts, DayOverview, SortOrder, TaskFilter, WeekStats};

use thiserror::Error;

/// Errors that can occur during task operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Task title cannot be empty.
    #[error("task title cannot be empty")]
    TitleEmpty,
    /// Task title exceeds the maximum length.
    #[error("task title too long (max {max} characters)")]
    TitleTooLong {
        /// Configured limit.
        max: usize,
    },
    /// Task with the given ID was not found in the addressed day.
    #[error("task not found: {0}")]
    TaskNotFound(String),
}
