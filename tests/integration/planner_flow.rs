//! Integration tests for the planner over a real data directory.
//!
//! Covers a full add / edit / toggle / delete cycle, recurrence, category
//! fallback and goal progress, checking what lands on disk after each step.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::mpsc;

use weekplan::clock::FixedClock;
use weekplan::events::{PlannerEvent, Toast, ToastLevel};
use weekplan::storage::{CATEGORIES_KEY, FileStore, KeyValueStore, Storage, TASKS_KEY};
use weekplan::tasks::{SortOrder, TaskError, TaskFilter};
use weekplan::{Planner, PlannerOptions};
use weekplan_model::{CategoryDraft, CategoryId, Day, Priority, RepeatPattern, TaskDraft, TaskPatch};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Wednesday 2026-10-14, 08:30 local.
fn wednesday_morning() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 14)
        .unwrap()
        .and_hms_opt(8, 30, 0)
        .unwrap()
}

fn open_planner(dir: &std::path::Path) -> (Planner<FileStore>, mpsc::Receiver<PlannerEvent>) {
    Planner::new(
        Storage::new(FileStore::open(dir).unwrap()),
        Arc::new(FixedClock::new(wednesday_morning())),
        PlannerOptions::default(),
    )
}

fn draft(title: &str) -> TaskDraft {
    TaskDraft::new(title, CategoryId::new("work"))
}

fn drain(rx: &mut mpsc::Receiver<PlannerEvent>) -> Vec<PlannerEvent> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

fn toasts(events: &[PlannerEvent]) -> Vec<&Toast> {
    events
        .iter()
        .filter_map(|e| match e {
            PlannerEvent::Toast(t) => Some(t),
            _ => None,
        })
        .collect()
}

// ===========================================================================
// Task lifecycle
// ===========================================================================

#[test]
fn task_lifecycle_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let (mut planner, mut rx) = open_planner(dir.path());
    assert_eq!(planner.selected_day(), Day::WEDNESDAY);

    let task = planner.add_task(draft("Quarterly report")).unwrap();
    planner
        .update_task(
            &task.id,
            TaskPatch {
                priority: Some(Priority::High),
                tags: Some(Some("finance, q4".to_string())),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    planner.toggle_task(&task.id).unwrap();

    let messages: Vec<String> = toasts(&drain(&mut rx)).iter().map(|t| t.message.clone()).collect();
    assert_eq!(messages, ["Task added", "Task updated", "Nice! Task completed"]);

    drop(planner);
    let (reopened, _rx) = open_planner(dir.path());
    let stored = &reopened.tasks().day(Day::WEDNESDAY)[0];
    assert_eq!(stored.id, task.id);
    assert_eq!(stored.priority, Priority::High);
    assert!(stored.completed);
    assert!(stored.completed_at.is_some());
    assert_eq!(stored.tag_list().collect::<Vec<_>>(), ["finance", "q4"]);
    assert_eq!(reopened.stats().productivity, 100);
}

#[test]
fn delete_of_unknown_id_persists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (mut planner, _rx) = open_planner(dir.path());
    let task = planner.add_task(draft("Stay")).unwrap();
    planner.switch_to_day(Day::THURSDAY);

    let err = planner.delete_task(&task.id).unwrap_err();
    assert!(matches!(err, TaskError::TaskNotFound(_)));

    let (reopened, _rx) = open_planner(dir.path());
    assert_eq!(reopened.tasks().len(), 1);
}

#[test]
fn tasks_document_uses_day_keys() {
    let dir = tempfile::tempdir().unwrap();
    let (mut planner, _rx) = open_planner(dir.path());
    planner.add_task(draft("Keyed")).unwrap();

    let raw = FileStore::open(dir.path()).unwrap().get(TASKS_KEY).unwrap().unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let obj = doc.as_object().unwrap();
    assert_eq!(obj.len(), 7);
    assert_eq!(obj["3"][0]["title"], "Keyed");
    assert_eq!(obj["3"][0]["day"], 3);
    assert!(obj["3"][0]["createdAt"].is_string());
}

// ===========================================================================
// Recurrence
// ===========================================================================

#[test]
fn weekday_recurrence_from_wednesday() {
    let dir = tempfile::tempdir().unwrap();
    let (mut planner, _rx) = open_planner(dir.path());
    let mut d = draft("Standup");
    d.repeat = RepeatPattern::Weekdays;
    let origin = planner.add_task(d).unwrap();

    // Mon, Tue, Thu, Fri get clones; Wed keeps only the origin.
    assert_eq!(planner.tasks().len(), 5);
    for day in [Day::MONDAY, Day::TUESDAY, Day::THURSDAY, Day::FRIDAY] {
        let bucket = planner.tasks().day(day);
        assert_eq!(bucket.len(), 1);
        assert!(bucket[0].is_clone_of(&origin.id, RepeatPattern::Weekdays));
        assert_eq!(bucket[0].day, day);
    }
    assert!(planner.tasks().day(Day::SUNDAY).is_empty());

    let (reopened, _rx) = open_planner(dir.path());
    assert_eq!(reopened.tasks().len(), 5);
}

#[test]
fn daily_then_weekdays_do_not_collide() {
    let dir = tempfile::tempdir().unwrap();
    let (mut planner, _rx) = open_planner(dir.path());
    let mut d = draft("Water plants");
    d.repeat = RepeatPattern::Daily;
    let origin = planner.add_task(d).unwrap();
    assert_eq!(planner.tasks().len(), 7);

    // Different pattern: not a duplicate of the daily clones.
    let extra = planner.schedule_recurring(&origin, RepeatPattern::Weekdays);
    assert_eq!(extra.len(), 4);
    assert!(planner.schedule_recurring(&origin, RepeatPattern::Weekdays).is_empty());
}

#[test]
fn monthly_recurrence_pinned_to_today() {
    let dir = tempfile::tempdir().unwrap();
    let (mut planner, _rx) = open_planner(dir.path());
    let mut d = draft("Invoice");
    d.repeat = RepeatPattern::Monthly;
    d.date = NaiveDate::from_ymd_opt(2027, 2, 28);
    planner.add_task(d).unwrap();

    // 2026-10-14 + one month = 2026-11-14, a Saturday.
    assert_eq!(planner.tasks().day(Day::SATURDAY).len(), 1);
    assert_eq!(planner.tasks().len(), 2);
}

// ===========================================================================
// Views
// ===========================================================================

#[test]
fn filters_and_counts_follow_selected_day() {
    let dir = tempfile::tempdir().unwrap();
    let (mut planner, _rx) = open_planner(dir.path());
    let mut today = draft("Dated today");
    today.date = NaiveDate::from_ymd_opt(2026, 10, 14);
    let a = planner.add_task(today).unwrap();
    planner.add_task(draft("Undated")).unwrap();
    planner.toggle_task(&a.id).unwrap();

    planner.switch_to_day(Day::MONDAY);
    let mut elsewhere = draft("Also today");
    elsewhere.date = NaiveDate::from_ymd_opt(2026, 10, 14);
    planner.add_task(elsewhere).unwrap();

    // Today's count is cross-day; the rest belong to Monday.
    let counts = planner.day_counts();
    assert_eq!((counts.all, counts.pending, counts.completed, counts.today), (1, 1, 0, 2));

    planner.switch_to_day(Day::WEDNESDAY);
    planner.set_filter(TaskFilter::Pending);
    let titles: Vec<_> = planner.filtered_tasks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Undated"]);

    planner.set_filter(TaskFilter::Today);
    assert_eq!(planner.filtered_tasks().len(), 1);

    let overview = planner.week_overview();
    assert_eq!(overview[3].rate, 50);
    assert_eq!(overview[1].total, 1);
}

#[test]
fn options_set_initial_view_state() {
    let dir = tempfile::tempdir().unwrap();
    let (planner, _rx) = Planner::new(
        Storage::new(FileStore::open(dir.path()).unwrap()),
        Arc::new(FixedClock::new(wednesday_morning())),
        PlannerOptions {
            default_filter: TaskFilter::Completed,
            default_sort: SortOrder::Oldest,
            max_title_len: 10,
            ..PlannerOptions::default()
        },
    );
    assert_eq!(planner.filter(), TaskFilter::Completed);
    assert_eq!(planner.sort_order(), SortOrder::Oldest);

    let mut planner = planner;
    let err = planner.add_task(draft("far too long a title")).unwrap_err();
    assert_eq!(err, TaskError::TitleTooLong { max: 10 });
}

// ===========================================================================
// Categories and goals
// ===========================================================================

#[test]
fn category_delete_leaves_orphans_resolving_to_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let (mut planner, mut rx) = open_planner(dir.path());
    let garden = planner.add_category(CategoryDraft::named("Garden")).unwrap();
    let mut d = draft("Mow");
    d.category = garden.id.clone();
    let task = planner.add_task(d).unwrap();

    planner.delete_category(&garden.id).unwrap();
    assert_eq!(planner.category_task_count(&garden.id), 1);
    assert_eq!(planner.resolve_category(&task.category).id, CategoryId::new("work"));

    let events = drain(&mut rx);
    assert!(events.contains(&PlannerEvent::CategoriesChanged));
    assert!(events.contains(&PlannerEvent::Toast(Toast::info("Category deleted"))));

    let raw = FileStore::open(dir.path()).unwrap().get(CATEGORIES_KEY).unwrap().unwrap();
    assert!(!raw.contains("Garden"));
}

#[test]
fn blank_category_name_is_rejected_with_toast() {
    let dir = tempfile::tempdir().unwrap();
    let (mut planner, mut rx) = open_planner(dir.path());
    assert!(planner.add_category(CategoryDraft::named("   ")).is_err());
    let events = drain(&mut rx);
    assert_eq!(toasts(&events)[0].level, ToastLevel::Error);
    assert_eq!(planner.categories().len(), 6);
}

#[test]
fn goal_progress_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let (mut planner, _rx) = open_planner(dir.path());
    let goal = planner.add_goal("Run 3 times").unwrap();
    planner.update_goal_progress(&goal.id, 2).unwrap();

    let (reopened, _rx) = open_planner(dir.path());
    let stored = &reopened.goals()[0];
    assert_eq!(stored.current, 1);
    assert!(stored.completed);
}
