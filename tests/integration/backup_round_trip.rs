//! Integration tests for whole-state export and import between two
//! planners backed by separate data directories.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tokio::sync::mpsc;

use weekplan::backup::{self, BackupError};
use weekplan::clock::FixedClock;
use weekplan::events::{PlannerEvent, Toast};
use weekplan::storage::{FileStore, GOALS_KEY, KeyValueStore, Storage};
use weekplan::{Planner, PlannerOptions};
use weekplan_model::bundle::{BundleError, EXPORT_VERSION};
use weekplan_model::{CategoryDraft, CategoryId, Day, Priority, RepeatPattern, TaskDraft};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn friday_evening() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap()
}

fn open_planner(dir: &std::path::Path) -> (Planner<FileStore>, mpsc::Receiver<PlannerEvent>) {
    Planner::new(
        Storage::new(FileStore::open(dir).unwrap()),
        Arc::new(FixedClock::new(friday_evening())),
        PlannerOptions::default(),
    )
}

fn drain_toasts(rx: &mut mpsc::Receiver<PlannerEvent>) -> Vec<Toast> {
    std::iter::from_fn(|| rx.try_recv().ok())
        .filter_map(|e| match e {
            PlannerEvent::Toast(t) => Some(t),
            _ => None,
        })
        .collect()
}

/// A planner with a bit of everything in it.
fn seeded(dir: &std::path::Path) -> Planner<FileStore> {
    let (mut planner, _rx) = open_planner(dir);
    let errands = planner.add_category(CategoryDraft::named("Errands")).unwrap();

    let mut groceries = TaskDraft::new("Groceries", errands.id);
    groceries.priority = Priority::Low;
    groceries.tags = Some("food".to_string());
    planner.add_task(groceries).unwrap();

    planner.switch_to_day(Day::MONDAY);
    let mut gym = TaskDraft::new("Gym", CategoryId::new("health"));
    gym.repeat = RepeatPattern::Weekly;
    gym.time = NaiveTime::from_hms_opt(7, 15, 0);
    let gym = planner.add_task(gym).unwrap();
    planner.toggle_task(&gym.id).unwrap();

    let goal = planner.add_goal("Read a book").unwrap();
    planner.toggle_goal(&goal.id).unwrap();
    planner
}

// ===========================================================================
// Round trip
// ===========================================================================

#[test]
fn export_then_import_reproduces_state() {
    let source_dir = tempfile::tempdir().unwrap();
    let target_dir = tempfile::tempdir().unwrap();
    let source = seeded(source_dir.path());
    let json = source.export_json().unwrap();

    let (mut target, mut rx) = open_planner(target_dir.path());
    let summary = target.import_json(&json).unwrap();
    assert_eq!(summary.tasks, 2);
    assert_eq!(summary.categories, 7);
    assert_eq!(summary.goals, 1);
    assert!(summary.persisted);
    assert_eq!(drain_toasts(&mut rx), [Toast::success("Data imported successfully")]);

    assert_eq!(target.tasks(), source.tasks());
    assert_eq!(target.categories(), source.categories());
    assert_eq!(target.goals(), source.goals());

    // The import reached disk, not just memory.
    drop(target);
    let (reopened, _rx) = open_planner(target_dir.path());
    assert_eq!(reopened.tasks(), source.tasks());
    assert_eq!(reopened.goals()[0].text, "Read a book");
}

#[test]
fn export_document_is_stamped() {
    let dir = tempfile::tempdir().unwrap();
    let planner = seeded(dir.path());
    let bundle = planner.export_bundle();
    assert_eq!(bundle.version.as_deref(), Some(EXPORT_VERSION));
    assert_eq!(
        bundle.export_date.map(|d| d.naive_utc()),
        Some(friday_evening())
    );

    let value: serde_json::Value = serde_json::from_str(&planner.export_json().unwrap()).unwrap();
    assert!(value["exportDate"].is_string());
    assert_eq!(value["tasks"]["1"][0]["title"], "Gym");
    assert_eq!(value["tasks"]["1"][0]["time"], "07:15");
}

#[test]
fn backup_file_round_trip_through_disk() {
    let source_dir = tempfile::tempdir().unwrap();
    let backup_dir = tempfile::tempdir().unwrap();
    let source = seeded(source_dir.path());

    let path = backup_dir.path().join(backup::default_file_name(source.today()));
    backup::write_file(&path, &source.export_json().unwrap()).unwrap();
    assert!(path.ends_with("backup-tasks-2026-10-16.json"));

    let target_dir = tempfile::tempdir().unwrap();
    let (mut target, _rx) = open_planner(target_dir.path());
    target.import_json(&backup::read_file(&path).unwrap()).unwrap();
    assert_eq!(target.tasks().len(), 2);
}

// ===========================================================================
// Rejected and partial documents
// ===========================================================================

#[test]
fn corrupted_file_leaves_state_and_disk_alone() {
    let dir = tempfile::tempdir().unwrap();
    let mut planner = seeded(dir.path());
    let before = planner.export_bundle();

    for bad in ["not json", "[1, 2]", r#"{"tasks": {}}"#, r#"{"tasks": 5, "categories": []}"#] {
        assert!(planner.import_json(bad).is_err(), "accepted {bad}");
    }
    assert_eq!(planner.tasks(), &before.tasks);
    assert_eq!(planner.categories(), before.categories.as_slice());

    let (reopened, _rx) = open_planner(dir.path());
    assert_eq!(reopened.tasks(), &before.tasks);
}

#[test]
fn rejection_reports_reason_and_toasts() {
    let dir = tempfile::tempdir().unwrap();
    let (mut planner, mut rx) = open_planner(dir.path());

    let err = planner.import_json(r#"{"tasks": {}}"#).unwrap_err();
    assert!(matches!(
        err,
        BackupError::Format(BundleError::MissingKey("categories"))
    ));
    assert_eq!(drain_toasts(&mut rx), [Toast::error("Invalid or corrupted file")]);

    let err = planner.import_json("{").unwrap_err();
    assert!(matches!(err, BackupError::Format(BundleError::InvalidJson(_))));
}

#[test]
fn document_without_goals_clears_goals() {
    let dir = tempfile::tempdir().unwrap();
    let mut planner = seeded(dir.path());
    assert_eq!(planner.goals().len(), 1);

    let summary = planner
        .import_json(r##"{"tasks": {"0": [], "6": []}, "categories": [{"id": "x", "name": "X", "color": "#000000", "icon": "bx bx-star"}]}"##)
        .unwrap();
    assert_eq!(summary.goals, 0);
    assert!(planner.goals().is_empty());
    assert!(planner.tasks().is_empty());
    assert_eq!(planner.categories()[0].id, CategoryId::new("x"));

    let raw = FileStore::open(dir.path()).unwrap().get(GOALS_KEY).unwrap().unwrap();
    assert_eq!(raw.trim(), "[]");
}
