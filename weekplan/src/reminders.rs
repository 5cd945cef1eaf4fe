//! Task reminders.
//!
//! Two mechanisms, both best effort:
//!
//! - a one-shot job per task with `reminder` set, firing at the task's
//!   local date and time ([`ReminderScheduler::schedule`]);
//! - a periodic heads-up sweep over the selected day that toasts tasks
//!   starting within the next minute ([`spawn_sweep`]).
//!
//! Each sweep first reloads the task document, so tasks written by another
//! process are swept and get their one-shot job on the next tick.
//!
//! A one-shot job owns a snapshot of the task taken when it was scheduled.
//! Editing or deleting the task afterwards does not cancel it; callers that
//! want that must abort the returned handle themselves.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use parking_lot::Mutex;

use weekplan_model::Task;

use crate::events::{EventSink, Toast};
use crate::planner::Planner;
use crate::storage::KeyValueStore;

/// Payload handed to the platform notification layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Collapses repeated notifications for the same task.
    pub tag: String,
}

impl Notification {
    /// The reminder notification for `task`.
    #[must_use]
    pub fn for_task(task: &Task) -> Self {
        Self {
            title: "Task reminder".to_string(),
            body: format!("⏰ {}", task.title),
            tag: format!("task-{}", task.id),
        }
    }
}

/// Delivers notifications to the user. Failures are the implementor's to
/// log; the scheduler never retries.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the log. Used when no desktop integration is
/// available.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        tracing::info!(
            title = %notification.title,
            body = %notification.body,
            tag = %notification.tag,
            "notification"
        );
    }
}

/// Time until `task` starts, if it has a date and time in the future.
#[must_use]
pub fn reminder_delay(task: &Task, now: NaiveDateTime) -> Option<Duration> {
    let delta = task.starts_at()? - now;
    if delta <= chrono::Duration::zero() {
        return None;
    }
    delta.to_std().ok()
}

/// Tasks dated today, not completed, starting strictly within `window`.
pub fn due_within(tasks: &[Task], now: NaiveDateTime, window: Duration) -> impl Iterator<Item = &Task> {
    let today = now.date();
    tasks.iter().filter(move |t| {
        !t.completed
            && t.is_dated(today)
            && reminder_delay(t, now).is_some_and(|delay| delay < window)
    })
}

/// Spawns one-shot reminder jobs on a tokio runtime.
#[derive(Clone)]
pub struct ReminderScheduler {
    runtime: tokio::runtime::Handle,
    notifier: Arc<dyn Notifier>,
    events: EventSink,
}

impl std::fmt::Debug for ReminderScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderScheduler").finish_non_exhaustive()
    }
}

impl ReminderScheduler {
    #[must_use]
    pub fn new(runtime: tokio::runtime::Handle, notifier: Arc<dyn Notifier>, events: EventSink) -> Self {
        Self {
            runtime,
            notifier,
            events,
        }
    }

    /// Schedules a reminder at `task`'s start time.
    ///
    /// Returns `None` when the task has no date/time or it is not in the
    /// future. The job fires even if the task is later edited or deleted.
    pub fn schedule(&self, task: &Task, now: NaiveDateTime) -> Option<tokio::task::JoinHandle<()>> {
        let delay = reminder_delay(task, now)?;
        let deadline = tokio::time::Instant::now() + delay;
        let notification = Notification::for_task(task);
        let toast = Toast::info(format!("Reminder: {}", task.title));
        let notifier = Arc::clone(&self.notifier);
        let events = self.events.clone();
        tracing::debug!(task_id = %task.id, delay_secs = delay.as_secs(), "reminder scheduled");
        Some(self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            notifier.notify(&notification);
            events.toast(toast);
        }))
    }
}

/// Runs the heads-up sweep every `interval` until the handle is aborted.
///
/// The first sweep happens one `interval` after spawning. Every tick
/// reloads tasks from storage and schedules one-shot reminders for any
/// that are new before sweeping.
pub fn spawn_sweep<S>(
    planner: Arc<Mutex<Planner<S>>>,
    interval: Duration,
    window: Duration,
) -> tokio::task::JoinHandle<()>
where
    S: KeyValueStore + 'static,
{
    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + interval;
        let mut tick = tokio::time::interval_at(start, interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            let (scheduled, fired) = {
                let mut planner = planner.lock();
                planner.reload_tasks();
                let scheduled = planner.schedule_pending_reminders();
                (scheduled, planner.sweep_reminders(window))
            };
            if scheduled > 0 {
                tracing::debug!(scheduled, "reminders scheduled for reloaded tasks");
            }
            if fired > 0 {
                tracing::debug!(fired, "heads-up reminders sent");
            }
        }
    })
}

/// "1 minute", "90 seconds", "5 minutes".
#[must_use]
pub fn describe_window(window: Duration) -> String {
    let secs = window.as_secs();
    match (secs / 60, secs % 60) {
        (1, 0) => "1 minute".to_string(),
        (m, 0) if m > 1 => format!("{m} minutes"),
        _ if secs == 1 => "1 second".to_string(),
        _ => format!("{secs} seconds"),
    }
}
