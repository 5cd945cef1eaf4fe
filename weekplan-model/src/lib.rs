//! Data model and JSON document format for `weekplan`.

pub mod bundle;
pub mod category;
pub mod day;
pub mod goal;
pub mod task;
pub mod week;

pub use category::{Category, CategoryDraft, CategoryId};
pub use day::Day;
pub use goal::{Goal, GoalId};
pub use task::{Priority, RepeatPattern, Task, TaskDraft, TaskId, TaskPatch};
pub use week::WeekTasks;
