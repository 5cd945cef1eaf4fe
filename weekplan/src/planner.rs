//! The planner facade: stores, UI state, persistence and notifications.
//!
//! [`Planner`] is the single entry point the front end talks to. Each
//! mutation goes through the owning store, is written to storage, and is
//! announced on the event channel returned by [`Planner::new`].
//!
//! A failed write is logged and reported as an error toast. The in-memory
//! change is kept, so the session stays consistent and the next successful
//! write catches storage up.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use weekplan_model::task::MAX_TASK_TITLE_LENGTH;
use weekplan_model::{
    Category, CategoryDraft, CategoryId, Day, Goal, GoalId, RepeatPattern, Task, TaskDraft, TaskId,
    TaskPatch, WeekTasks,
};

use crate::categories::{CategoryError, CategoryStore};
use crate::clock::Clock;
use crate::events::{EventSink, PlannerEvent, Toast};
use crate::goals::{GoalError, GoalStore};
use crate::reminders::{self, Notifier, ReminderScheduler};
use crate::storage::{KeyValueStore, Storage, StorageError};
use crate::tasks::{DayCounts, DayOverview, SortOrder, TaskError, TaskFilter, TaskStore, WeekStats, view};

/// Default capacity of the event channel.
pub const DEFAULT_EVENT_BUFFER: usize = 64;

/// How the front end lays out the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

impl ViewMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::List => Self::Grid,
            Self::Grid => Self::List,
        }
    }
}

/// Construction-time settings for a [`Planner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerOptions {
    pub default_filter: TaskFilter,
    pub default_sort: SortOrder,
    pub max_title_len: usize,
    pub event_buffer: usize,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            default_filter: TaskFilter::All,
            default_sort: SortOrder::Newest,
            max_title_len: MAX_TASK_TITLE_LENGTH,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

/// Task, category and goal state for one user, plus view state.
pub struct Planner<S: KeyValueStore> {
    pub(crate) storage: Storage<S>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) tasks: TaskStore,
    pub(crate) categories: CategoryStore,
    pub(crate) goals: GoalStore,
    selected_day: Day,
    filter: TaskFilter,
    sort: SortOrder,
    view_mode: ViewMode,
    pub(crate) events: EventSink,
    reminders: Option<ReminderScheduler>,
    /// Tasks that already have a one-shot reminder job.
    scheduled: HashSet<TaskId>,
}

impl<S: KeyValueStore> std::fmt::Debug for Planner<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("selected_day", &self.selected_day)
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .field("tasks", &self.tasks.week().len())
            .field("categories", &self.categories.all().len())
            .field("goals", &self.goals.all().len())
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> Planner<S> {
    /// Loads all collections from `storage` and selects today's weekday.
    ///
    /// Returns the planner and the receiver for its [`PlannerEvent`]s.
    #[must_use]
    pub fn new(
        storage: Storage<S>,
        clock: Arc<dyn Clock>,
        options: PlannerOptions,
    ) -> (Self, tokio::sync::mpsc::Receiver<PlannerEvent>) {
        let (events, rx) = EventSink::channel(options.event_buffer);
        let week = storage.load_tasks();
        let categories = storage.load_categories();
        let goals = storage.load_goals();
        tracing::info!(
            tasks = week.len(),
            categories = categories.len(),
            goals = goals.len(),
            "planner loaded"
        );
        let planner = Self {
            selected_day: clock.weekday(),
            tasks: TaskStore::new(week, options.max_title_len),
            categories: CategoryStore::new(categories),
            goals: GoalStore::new(goals),
            filter: options.default_filter,
            sort: options.default_sort,
            view_mode: ViewMode::default(),
            storage,
            clock,
            events,
            reminders: None,
            scheduled: HashSet::new(),
        };
        (planner, rx)
    }

    /// Enables one-shot reminders for tasks added from now on.
    #[must_use]
    pub fn with_reminders(mut self, runtime: tokio::runtime::Handle, notifier: Arc<dyn Notifier>) -> Self {
        self.reminders = Some(ReminderScheduler::new(runtime, notifier, self.events.clone()));
        self
    }

    // --- view state ---

    #[must_use]
    pub const fn selected_day(&self) -> Day {
        self.selected_day
    }

    #[must_use]
    pub const fn filter(&self) -> TaskFilter {
        self.filter
    }

    #[must_use]
    pub const fn sort_order(&self) -> SortOrder {
        self.sort
    }

    #[must_use]
    pub const fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Selects the bucket that adds, edits and the list view act on.
    pub fn switch_to_day(&mut self, day: Day) {
        if self.selected_day != day {
            tracing::debug!(from = %self.selected_day, to = %day, "day switched");
            self.selected_day = day;
            self.events.emit(PlannerEvent::TasksChanged);
        }
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
        self.events.emit(PlannerEvent::TasksChanged);
    }

    /// Flips the creation-time direction and returns the new one.
    pub fn toggle_sort(&mut self) -> SortOrder {
        self.sort = self.sort.toggled();
        self.events.emit(PlannerEvent::TasksChanged);
        self.sort
    }

    pub fn toggle_view_mode(&mut self) -> ViewMode {
        self.view_mode = self.view_mode.toggled();
        self.view_mode
    }

    // --- reads ---

    /// Today's local date according to the planner's clock.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    #[must_use]
    pub const fn tasks(&self) -> &WeekTasks {
        self.tasks.week()
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        self.categories.all()
    }

    #[must_use]
    pub fn goals(&self) -> &[Goal] {
        self.goals.all()
    }

    /// The selected day's tasks under the active filter and sort order.
    #[must_use]
    pub fn filtered_tasks(&self) -> Vec<&Task> {
        view::filtered(
            self.tasks.week().day(self.selected_day),
            self.filter,
            self.sort,
            self.clock.today(),
        )
    }

    #[must_use]
    pub fn stats(&self) -> WeekStats {
        WeekStats::compute(self.tasks.week(), self.clock.today())
    }

    #[must_use]
    pub fn day_counts(&self) -> DayCounts {
        DayCounts::compute(self.tasks.week(), self.selected_day, self.clock.today())
    }

    #[must_use]
    pub fn week_overview(&self) -> Vec<DayOverview> {
        view::week_overview(self.tasks.week())
    }

    #[must_use]
    pub fn resolve_category(&self, id: &CategoryId) -> Category {
        self.categories.resolve(id)
    }

    #[must_use]
    pub fn category_task_count(&self, id: &CategoryId) -> usize {
        self.tasks.count_for_category(id)
    }

    // --- task mutations ---

    /// Adds a task to the selected day.
    ///
    /// Schedules a reminder when requested and the task has a date and
    /// time, then expands recurrence.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError`] if the title is blank or too long.
    pub fn add_task(&mut self, draft: TaskDraft) -> Result<Task, TaskError> {
        let repeat = draft.repeat;
        let task = self
            .tasks
            .add(self.selected_day, draft, self.clock.now())
            .inspect_err(|e| self.reject(e))?;
        self.commit_tasks(Toast::success("Task added"));

        if task.reminder && task.date.is_some() && task.time.is_some() {
            if let Some(scheduler) = &self.reminders {
                // The job outlives edits and deletes of this task.
                if scheduler.schedule(&task, self.clock.local_now()).is_some() {
                    self.scheduled.insert(task.id.clone());
                }
            }
        }
        if repeat != RepeatPattern::None {
            self.schedule_recurring(&task, repeat);
        }
        Ok(task)
    }

    /// Places recurring clones of `task` and persists once.
    pub fn schedule_recurring(&mut self, task: &Task, pattern: RepeatPattern) -> Vec<Task> {
        let clones = self.tasks.schedule_recurring(task, pattern, self.clock.today());
        if !clones.is_empty() {
            self.persist_tasks();
            self.events.emit(PlannerEvent::TasksChanged);
        }
        clones
    }

    /// Edits a task in the selected day.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TaskNotFound`] if the selected day has no such
    /// task, or a title error for a blank or oversized title. Only the
    /// title errors are toasted.
    pub fn update_task(&mut self, id: &TaskId, patch: TaskPatch) -> Result<Task, TaskError> {
        let task = self
            .tasks
            .update(self.selected_day, id, patch)
            .inspect_err(|e| match e {
                TaskError::TaskNotFound(_) => tracing::debug!(error = %e, "update skipped"),
                _ => self.reject(e),
            })?;
        self.commit_tasks(Toast::success("Task updated"));
        Ok(task)
    }

    /// Removes a task from the selected day.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TaskNotFound`] if the selected day has no such task.
    pub fn delete_task(&mut self, id: &TaskId) -> Result<Task, TaskError> {
        let task = self
            .tasks
            .delete(self.selected_day, id)
            .inspect_err(|e| self.reject(e))?;
        self.commit_tasks(Toast::info("Task deleted"));
        Ok(task)
    }

    /// Flips completion of a task in the selected day.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TaskNotFound`] if the selected day has no such task.
    pub fn toggle_task(&mut self, id: &TaskId) -> Result<Task, TaskError> {
        let task = self
            .tasks
            .toggle(self.selected_day, id, self.clock.now())
            .inspect_err(|e| self.reject(e))?;
        let message = if task.completed {
            "Nice! Task completed"
        } else {
            "Task reopened"
        };
        self.commit_tasks(Toast::success(message));
        Ok(task)
    }

    // --- categories ---

    /// # Errors
    ///
    /// Returns [`CategoryError::NameEmpty`] for a blank name.
    pub fn add_category(&mut self, draft: CategoryDraft) -> Result<Category, CategoryError> {
        let category = self.categories.add(draft).inspect_err(|e| self.reject(e))?;
        self.commit_categories(Toast::success("Category added"));
        Ok(category)
    }

    /// Deletes a category. Tasks referencing it keep the id.
    ///
    /// # Errors
    ///
    /// Returns [`CategoryError::NotFound`] for an unknown id.
    pub fn delete_category(&mut self, id: &CategoryId) -> Result<Category, CategoryError> {
        let category = self.categories.delete(id).inspect_err(|e| self.reject(e))?;
        let orphaned = self.tasks.count_for_category(id);
        if orphaned > 0 {
            tracing::debug!(category_id = %id, orphaned, "category deleted with tasks still referencing it");
        }
        self.commit_categories(Toast::info("Category deleted"));
        Ok(category)
    }

    // --- goals ---

    /// # Errors
    ///
    /// Returns [`GoalError::TextEmpty`] for blank text.
    pub fn add_goal(&mut self, text: &str) -> Result<Goal, GoalError> {
        let goal = self
            .goals
            .add(text, self.clock.now())
            .inspect_err(|e| self.reject(e))?;
        self.commit_goals(Some(Toast::success("Goal added")));
        Ok(goal)
    }

    /// # Errors
    ///
    /// Returns [`GoalError::NotFound`] for an unknown id.
    pub fn toggle_goal(&mut self, id: &GoalId) -> Result<Goal, GoalError> {
        let goal = self.goals.toggle(id).inspect_err(|e| self.reject(e))?;
        self.commit_goals(None);
        Ok(goal)
    }

    /// # Errors
    ///
    /// Returns [`GoalError::NotFound`] for an unknown id.
    pub fn update_goal_progress(&mut self, id: &GoalId, value: u32) -> Result<Goal, GoalError> {
        let goal = self
            .goals
            .update_progress(id, value)
            .inspect_err(|e| self.reject(e))?;
        self.commit_goals(None);
        Ok(goal)
    }

    // --- reminders ---

    /// Schedules one-shot reminders for every open task that asks for one
    /// and starts in the future. Returns how many were scheduled.
    ///
    /// Recurring clones are skipped; only the task they were cloned from
    /// gets a job. A task is never scheduled twice, so this is safe to
    /// call again after [`reload_tasks`](Self::reload_tasks).
    pub fn schedule_pending_reminders(&mut self) -> usize {
        let Some(scheduler) = &self.reminders else {
            return 0;
        };
        let now = self.clock.local_now();
        let mut count = 0;
        let pending = self
            .tasks
            .week()
            .all()
            .filter(|t| t.reminder && !t.completed && !t.is_recurring);
        for task in pending {
            if self.scheduled.contains(&task.id) {
                continue;
            }
            if scheduler.schedule(task, now).is_some() {
                self.scheduled.insert(task.id.clone());
                count += 1;
            }
        }
        count
    }

    /// Re-reads the task document, picking up writes made by another
    /// process. Returns whether the week changed.
    pub fn reload_tasks(&mut self) -> bool {
        let week = self.storage.load_tasks();
        if &week == self.tasks.week() {
            return false;
        }
        self.tasks.replace(week);
        tracing::debug!(tasks = self.tasks.week().len(), "tasks reloaded from storage");
        self.events.emit(PlannerEvent::TasksChanged);
        true
    }

    /// Toasts every selected-day task starting within `window`.
    ///
    /// Returns how many toasts were sent.
    pub fn sweep_reminders(&self, window: Duration) -> usize {
        let now = self.clock.local_now();
        let when = reminders::describe_window(window);
        let mut fired = 0;
        for task in reminders::due_within(self.tasks.week().day(self.selected_day), now, window) {
            self.events
                .toast(Toast::info(format!("Reminder: {} starts in {when}", task.title)));
            fired += 1;
        }
        fired
    }

    /// The event sink, for components that report through the planner.
    #[must_use]
    pub const fn events(&self) -> &EventSink {
        &self.events
    }

    // --- persistence ---

    fn reject(&self, err: &dyn std::error::Error) {
        tracing::debug!(error = %err, "planner operation rejected");
        self.events.toast(Toast::error(capitalize(&err.to_string())));
    }

    fn commit_tasks(&self, toast: Toast) {
        self.persist_tasks();
        self.events.emit(PlannerEvent::TasksChanged);
        self.events.toast(toast);
    }

    fn commit_categories(&self, toast: Toast) {
        self.persist_categories();
        self.events.emit(PlannerEvent::CategoriesChanged);
        self.events.toast(toast);
    }

    fn commit_goals(&self, toast: Option<Toast>) {
        self.persist_goals();
        self.events.emit(PlannerEvent::GoalsChanged);
        if let Some(toast) = toast {
            self.events.toast(toast);
        }
    }

    pub(crate) fn persist_tasks(&self) -> bool {
        let result = self.storage.save_tasks(self.tasks.week());
        self.report_save("tasks", result)
    }

    pub(crate) fn persist_categories(&self) -> bool {
        let result = self.storage.save_categories(self.categories.all());
        self.report_save("categories", result)
    }

    pub(crate) fn persist_goals(&self) -> bool {
        let result = self.storage.save_goals(self.goals.all());
        self.report_save("goals", result)
    }

    fn report_save(&self, what: &'static str, result: Result<(), StorageError>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(collection = what, error = %err, "save failed, in-memory state kept");
                self.events
                    .toast(Toast::error("Save failed! Storage may be full."));
                false
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
