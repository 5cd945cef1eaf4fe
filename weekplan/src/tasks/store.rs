//! In-memory task store addressed by `(day, id)`.
//!
//! The store only mutates data. Persistence, reminders and notifications
//! are the planner's job.

use chrono::{DateTime, NaiveDate, Utc};

use weekplan_model::task::MAX_TASK_TITLE_LENGTH;
use weekplan_model::{CategoryId, Day, RepeatPattern, Task, TaskDraft, TaskId, TaskPatch, WeekTasks};

use super::TaskError;
use super::recurrence;

/// Owns the seven task buckets.
#[derive(Debug, Clone)]
pub struct TaskStore {
    week: WeekTasks,
    max_title_len: usize,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new(WeekTasks::new(), MAX_TASK_TITLE_LENGTH)
    }
}

impl TaskStore {
    /// Wraps loaded buckets. Titles longer than `max_title_len` characters
    /// are rejected on add and update.
    #[must_use]
    pub const fn new(week: WeekTasks, max_title_len: usize) -> Self {
        Self {
            week,
            max_title_len,
        }
    }

    /// Read-only view of all buckets.
    #[must_use]
    pub const fn week(&self) -> &WeekTasks {
        &self.week
    }

    /// Swaps in a whole new week, e.g. after an import.
    pub fn replace(&mut self, week: WeekTasks) -> WeekTasks {
        std::mem::replace(&mut self.week, week)
    }

    /// Looks up a task in one bucket.
    #[must_use]
    pub fn get(&self, day: Day, id: &TaskId) -> Option<&Task> {
        self.week.find(day, id)
    }

    fn validate_title(&self, title: &str) -> Result<String, TaskError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskError::TitleEmpty);
        }
        if title.chars().count() > self.max_title_len {
            return Err(TaskError::TitleTooLong {
                max: self.max_title_len,
            });
        }
        Ok(title.to_string())
    }

    /// Appends a new task to `day`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TitleEmpty`] or [`TaskError::TitleTooLong`]
    /// when the title is blank or over the limit.
    pub fn add(&mut self, day: Day, draft: TaskDraft, now: DateTime<Utc>) -> Result<Task, TaskError> {
        let title = self.validate_title(&draft.title)?;
        let task = Task {
            id: TaskId::new(),
            title,
            description: draft.description.filter(|d| !d.trim().is_empty()),
            category: draft.category,
            priority: draft.priority,
            date: draft.date,
            time: draft.time,
            completed: false,
            completed_at: None,
            created_at: now,
            day,
            repeat: draft.repeat,
            reminder: draft.reminder,
            tags: draft.tags.filter(|t| !t.trim().is_empty()),
            is_recurring: false,
            original_id: None,
            pattern: None,
        };
        self.week.day_mut(day).push(task.clone());
        tracing::debug!(task_id = %task.id, day = %day, "task added");
        Ok(task)
    }

    /// Merges `patch` over the task `id` in `day`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TaskNotFound`] if `day` holds no such task, or
    /// a title validation error when the patch carries a bad title.
    pub fn update(&mut self, day: Day, id: &TaskId, mut patch: TaskPatch) -> Result<Task, TaskError> {
        if let Some(title) = patch.title.take() {
            patch.title = Some(self.validate_title(&title)?);
        }
        let task = self
            .week
            .find_mut(day, id)
            .ok_or_else(|| TaskError::TaskNotFound(id.to_string()))?;
        patch.apply(task);
        tracing::debug!(task_id = %id, day = %day, "task updated");
        Ok(task.clone())
    }

    /// Removes the task `id` from `day`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TaskNotFound`] if `day` holds no such task.
    pub fn delete(&mut self, day: Day, id: &TaskId) -> Result<Task, TaskError> {
        let bucket = self.week.day_mut(day);
        let pos = bucket
            .iter()
            .position(|t| t.id == *id)
            .ok_or_else(|| TaskError::TaskNotFound(id.to_string()))?;
        let removed = bucket.remove(pos);
        tracing::debug!(task_id = %id, day = %day, "task deleted");
        Ok(removed)
    }

    /// Flips completion, stamping `completed_at` when completing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TaskNotFound`] if `day` holds no such task.
    pub fn toggle(&mut self, day: Day, id: &TaskId, now: DateTime<Utc>) -> Result<Task, TaskError> {
        let task = self
            .week
            .find_mut(day, id)
            .ok_or_else(|| TaskError::TaskNotFound(id.to_string()))?;
        task.completed = !task.completed;
        task.completed_at = task.completed.then_some(now);
        Ok(task.clone())
    }

    /// Places clones of `origin` in every other bucket `pattern` covers.
    ///
    /// Buckets already holding a clone of `origin` made with the same
    /// pattern are skipped. Returns the clones that were created.
    pub fn schedule_recurring(
        &mut self,
        origin: &Task,
        pattern: RepeatPattern,
        today: NaiveDate,
    ) -> Vec<Task> {
        let mut created = Vec::new();
        for day in recurrence::target_days(pattern, origin.day, today) {
            if day == origin.day {
                continue;
            }
            let bucket = self.week.day_mut(day);
            if bucket.iter().any(|t| t.is_clone_of(&origin.id, pattern)) {
                tracing::trace!(origin = %origin.id, day = %day, "clone already present");
                continue;
            }
            let clone = recurrence::clone_into(origin, day, pattern);
            bucket.push(clone.clone());
            created.push(clone);
        }
        if !created.is_empty() {
            tracing::debug!(origin = %origin.id, %pattern, clones = created.len(), "recurring clones created");
        }
        created
    }

    /// Tasks referencing `category` across the whole week.
    #[must_use]
    pub fn count_for_category(&self, category: &CategoryId) -> usize {
        self.week.all().filter(|t| t.category == *category).count()
    }
}
