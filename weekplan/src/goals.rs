//! Weekly goals with clamped progress.
//!
//! Every mutation leaves `completed == (current >= target)`.

use chrono::{DateTime, Utc};

use weekplan_model::{Goal, GoalId};

/// Errors that can occur during goal operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GoalError {
    /// Goal text cannot be empty.
    #[error("goal text cannot be empty")]
    TextEmpty,
    /// No goal has the given id.
    #[error("goal not found: {0}")]
    NotFound(String),
}

/// Owns the goal list.
#[derive(Debug, Clone, Default)]
pub struct GoalStore {
    goals: Vec<Goal>,
}

impl GoalStore {
    #[must_use]
    pub const fn new(goals: Vec<Goal>) -> Self {
        Self { goals }
    }

    #[must_use]
    pub fn all(&self) -> &[Goal] {
        &self.goals
    }

    /// Appends a goal with target 1 and no progress.
    ///
    /// # Errors
    ///
    /// Returns [`GoalError::TextEmpty`] if the trimmed text is empty.
    pub fn add(&mut self, text: &str, now: DateTime<Utc>) -> Result<Goal, GoalError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GoalError::TextEmpty);
        }
        let goal = Goal {
            id: GoalId::new(),
            text: text.to_string(),
            completed: false,
            target: 1,
            current: 0,
            created_at: now,
        };
        self.goals.push(goal.clone());
        tracing::debug!(goal_id = %goal.id, "goal added");
        Ok(goal)
    }

    /// Flips completion and snaps `current` to `target` or 0.
    ///
    /// # Errors
    ///
    /// Returns [`GoalError::NotFound`] for an unknown id.
    pub fn toggle(&mut self, id: &GoalId) -> Result<Goal, GoalError> {
        let goal = self.find_mut(id)?;
        goal.completed = !goal.completed;
        goal.current = if goal.completed { goal.target } else { 0 };
        Ok(goal.clone())
    }

    /// Sets progress, clamped to the target.
    ///
    /// # Errors
    ///
    /// Returns [`GoalError::NotFound`] for an unknown id.
    pub fn update_progress(&mut self, id: &GoalId, value: u32) -> Result<Goal, GoalError> {
        let goal = self.find_mut(id)?;
        goal.current = value.min(goal.target);
        goal.completed = goal.current >= goal.target;
        Ok(goal.clone())
    }

    /// Swaps in a whole new list, e.g. after an import.
    pub fn replace(&mut self, goals: Vec<Goal>) -> Vec<Goal> {
        std::mem::replace(&mut self.goals, goals)
    }

    fn find_mut(&mut self, id: &GoalId) -> Result<&mut Goal, GoalError> {
        self.goals
            .iter_mut()
            .find(|g| g.id == *id)
            .ok_or_else(|| GoalError::NotFound(id.to_string()))
    }
}
