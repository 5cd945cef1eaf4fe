//! Integration tests for reminder delivery on a paused tokio clock.
//!
//! The planner's wall clock is a `FixedClock`; the tokio clock is paused
//! and advanced by hand, so delays are exercised without real sleeping.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use weekplan::clock::{Clock, FixedClock};
use weekplan::events::{PlannerEvent, Toast};
use weekplan::reminders::{self, Notification, Notifier};
use weekplan::storage::{FileStore, MemoryStore, Storage};
use weekplan::{Planner, PlannerOptions};
use weekplan_model::{CategoryId, RepeatPattern, TaskDraft};

// ---------------------------------------------------------------------------
// Helper types and functions
// ---------------------------------------------------------------------------

/// Keeps every notification it is handed.
#[derive(Default)]
struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    fn bodies(&self) -> Vec<String> {
        self.seen.lock().iter().map(|n| n.body.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.seen.lock().push(notification.clone());
    }
}

/// Friday 2026-10-16, 09:00.
fn nine_am() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

fn planner_with_reminders(
    notifier: Arc<RecordingNotifier>,
) -> (Planner<MemoryStore>, mpsc::Receiver<PlannerEvent>) {
    let (planner, rx) = Planner::new(
        Storage::new(MemoryStore::new()),
        Arc::new(FixedClock::new(nine_am())),
        PlannerOptions::default(),
    );
    (
        planner.with_reminders(tokio::runtime::Handle::current(), notifier),
        rx,
    )
}

fn reminder_draft(title: &str, h: u32, m: u32, s: u32) -> TaskDraft {
    let mut draft = TaskDraft::new(title, CategoryId::new("personal"));
    draft.date = NaiveDate::from_ymd_opt(2026, 10, 16);
    draft.time = NaiveTime::from_hms_opt(h, m, s);
    draft.reminder = true;
    draft
}

/// Waits for the next toast whose message starts with `prefix`.
async fn next_toast(rx: &mut mpsc::Receiver<PlannerEvent>, prefix: &str) -> Toast {
    loop {
        match rx.recv().await.expect("event channel closed") {
            PlannerEvent::Toast(t) if t.message.starts_with(prefix) => return t,
            _ => {}
        }
    }
}

async fn settle() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

// ===========================================================================
// One-shot reminders
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn reminder_fires_at_start_time_not_before() {
    let notifier = Arc::new(RecordingNotifier::default());
    let (mut planner, mut rx) = planner_with_reminders(Arc::clone(&notifier));
    planner.add_task(reminder_draft("Dentist", 9, 5, 0)).unwrap();

    tokio::time::advance(Duration::from_secs(4 * 60)).await;
    settle().await;
    assert!(notifier.bodies().is_empty());

    tokio::time::advance(Duration::from_secs(59)).await;
    settle().await;
    assert!(notifier.bodies().is_empty());

    tokio::time::advance(Duration::from_secs(1)).await;
    settle().await;
    assert_eq!(notifier.bodies(), ["⏰ Dentist"]);
    let toast = next_toast(&mut rx, "Reminder").await;
    assert_eq!(toast, Toast::info("Reminder: Dentist"));

    let seen = notifier.seen.lock().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].title, "Task reminder");
    assert_eq!(seen[0].body, "⏰ Dentist");
    assert!(seen[0].tag.starts_with("task-"));
}

#[tokio::test(start_paused = true)]
async fn past_or_incomplete_reminders_are_not_scheduled() {
    let notifier = Arc::new(RecordingNotifier::default());
    let (mut planner, _rx) = planner_with_reminders(Arc::clone(&notifier));

    planner.add_task(reminder_draft("Already started", 8, 30, 0)).unwrap();
    let mut undated = reminder_draft("No date", 10, 0, 0);
    undated.date = None;
    planner.add_task(undated).unwrap();
    let mut opted_out = reminder_draft("Quiet", 10, 0, 0);
    opted_out.reminder = false;
    planner.add_task(opted_out).unwrap();

    tokio::time::advance(Duration::from_secs(24 * 3600)).await;
    settle().await;
    assert!(notifier.bodies().is_empty());
}

#[tokio::test(start_paused = true)]
async fn deleted_task_still_gets_its_reminder() {
    let notifier = Arc::new(RecordingNotifier::default());
    let (mut planner, mut rx) = planner_with_reminders(Arc::clone(&notifier));
    let task = planner.add_task(reminder_draft("Call mum", 9, 1, 0)).unwrap();
    planner.delete_task(&task.id).unwrap();
    assert!(planner.tasks().is_empty());

    tokio::time::advance(Duration::from_secs(61)).await;
    next_toast(&mut rx, "Reminder").await;
    assert_eq!(notifier.bodies(), ["⏰ Call mum"]);
}

#[tokio::test(start_paused = true)]
async fn pending_reminders_skip_completed_tasks() {
    let notifier = Arc::new(RecordingNotifier::default());
    let (mut planner, _rx) = Planner::new(
        Storage::new(MemoryStore::new()),
        Arc::new(FixedClock::new(nine_am())),
        PlannerOptions::default(),
    );
    // Added before reminders were enabled, as when loading from disk.
    planner.add_task(reminder_draft("Open", 9, 10, 0)).unwrap();
    let done = planner.add_task(reminder_draft("Done", 9, 10, 0)).unwrap();
    planner.toggle_task(&done.id).unwrap();

    let mut planner = planner.with_reminders(
        tokio::runtime::Handle::current(),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );
    assert_eq!(planner.schedule_pending_reminders(), 1);

    tokio::time::advance(Duration::from_secs(601)).await;
    settle().await;
    assert_eq!(notifier.bodies(), ["⏰ Open"]);
}

#[tokio::test(start_paused = true)]
async fn recurring_clones_share_one_reminder() {
    let notifier = Arc::new(RecordingNotifier::default());
    let (mut planner, _rx) = Planner::new(
        Storage::new(MemoryStore::new()),
        Arc::new(FixedClock::new(nine_am())),
        PlannerOptions::default(),
    );
    let mut stretch = reminder_draft("Stretch", 9, 10, 0);
    stretch.repeat = RepeatPattern::Daily;
    planner.add_task(stretch).unwrap();
    assert_eq!(planner.tasks().len(), 7);

    let mut planner = planner.with_reminders(
        tokio::runtime::Handle::current(),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );
    assert_eq!(planner.schedule_pending_reminders(), 1);
    assert_eq!(planner.schedule_pending_reminders(), 0);

    tokio::time::advance(Duration::from_secs(601)).await;
    settle().await;
    assert_eq!(notifier.bodies(), ["⏰ Stretch"]);
}

#[tokio::test(start_paused = true)]
async fn added_task_is_not_scheduled_again() {
    let notifier = Arc::new(RecordingNotifier::default());
    let (mut planner, _rx) = planner_with_reminders(Arc::clone(&notifier));
    planner.add_task(reminder_draft("Dentist", 9, 5, 0)).unwrap();
    assert_eq!(planner.schedule_pending_reminders(), 0);

    tokio::time::advance(Duration::from_secs(301)).await;
    settle().await;
    assert_eq!(notifier.bodies(), ["⏰ Dentist"]);
}

// ===========================================================================
// Heads-up sweep
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn sweep_toasts_tasks_starting_within_window() {
    let (mut planner, mut rx) = Planner::new(
        Storage::new(MemoryStore::new()),
        Arc::new(FixedClock::new(nine_am())),
        PlannerOptions::default(),
    );
    let mut soon = reminder_draft("Standup", 9, 0, 30);
    soon.reminder = false;
    planner.add_task(soon).unwrap();
    planner.add_task(reminder_draft("Lunch", 12, 0, 0)).unwrap();

    let planner = Arc::new(Mutex::new(planner));
    let sweep = reminders::spawn_sweep(
        Arc::clone(&planner),
        Duration::from_secs(60),
        Duration::from_secs(60),
    );

    // Nothing before the first interval elapses.
    settle().await;
    assert!(
        std::iter::from_fn(|| rx.try_recv().ok())
            .all(|e| !matches!(&e, PlannerEvent::Toast(t) if t.message.starts_with("Reminder")))
    );

    tokio::time::advance(Duration::from_secs(60)).await;
    let toast = next_toast(&mut rx, "Reminder").await;
    assert_eq!(toast.message, "Reminder: Standup starts in 1 minute");

    sweep.abort();
    assert!(sweep.await.unwrap_err().is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn sweep_picks_up_tasks_written_by_another_process() {
    let dir = tempfile::tempdir().unwrap();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(nine_am()));
    let notifier = Arc::new(RecordingNotifier::default());

    let (watcher, mut rx) = Planner::new(
        Storage::new(FileStore::open(dir.path()).unwrap()),
        Arc::clone(&clock),
        PlannerOptions::default(),
    );
    let mut watcher = watcher.with_reminders(
        tokio::runtime::Handle::current(),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );
    assert_eq!(watcher.schedule_pending_reminders(), 0);
    let watcher = Arc::new(Mutex::new(watcher));
    let sweep = reminders::spawn_sweep(
        Arc::clone(&watcher),
        Duration::from_secs(60),
        Duration::from_secs(60),
    );
    settle().await;

    // A separate `weekplan add` run against the same data directory.
    let (mut writer, _writer_rx) = Planner::new(
        Storage::new(FileStore::open(dir.path()).unwrap()),
        Arc::clone(&clock),
        PlannerOptions::default(),
    );
    writer.add_task(reminder_draft("Standup", 9, 0, 30)).unwrap();

    tokio::time::advance(Duration::from_secs(60)).await;
    let toast = next_toast(&mut rx, "Reminder").await;
    assert_eq!(toast.message, "Reminder: Standup starts in 1 minute");
    assert_eq!(watcher.lock().tasks().len(), 1);
    assert!(notifier.bodies().is_empty());

    // The clock is fixed at 09:00, so the one-shot job is 30s out from the sweep.
    tokio::time::advance(Duration::from_secs(30)).await;
    settle().await;
    assert_eq!(notifier.bodies(), ["⏰ Standup"]);
    assert_eq!(watcher.lock().schedule_pending_reminders(), 0);

    sweep.abort();
    assert!(sweep.await.unwrap_err().is_cancelled());
}
