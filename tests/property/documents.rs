//! Property-based tests for the persisted JSON documents.
//!
//! Uses proptest to verify:
//! 1. Arbitrary text never causes a panic in `bundle::decode` or in
//!    `WeekTasks` decoding (returns `Err` gracefully).
//! 2. Any valid week survives a store/load cycle with seven buckets and
//!    every task's `day` matching its bucket.
//! 3. Tasks whose stored `day` disagrees with their bucket are normalized.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use weekplan_model::bundle::{self, Bundle};
use weekplan_model::{Category, CategoryId, Day, Priority, RepeatPattern, Task, TaskId, WeekTasks};

// --- Strategies ---

fn arb_task_id() -> impl Strategy<Value = TaskId> {
    any::<u128>().prop_map(|n| TaskId::from_uuid(Uuid::from_u128(n)))
}

fn arb_day() -> impl Strategy<Value = Day> {
    (0u8..7).prop_map(|i| Day::new(i).unwrap())
}

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Low),
        Just(Priority::Medium),
        Just(Priority::High),
        Just(Priority::Urgent),
    ]
}

fn arb_repeat() -> impl Strategy<Value = RepeatPattern> {
    prop_oneof![
        Just(RepeatPattern::None),
        Just(RepeatPattern::Daily),
        Just(RepeatPattern::Weekly),
        Just(RepeatPattern::Weekdays),
        Just(RepeatPattern::Monthly),
    ]
}

fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    (1_700_000_000i64..1_800_000_000).prop_map(|secs| DateTime::from_timestamp(secs, 0).unwrap())
}

/// Whole minutes, which is what the time field stores.
fn arb_time() -> impl Strategy<Value = Option<NaiveTime>> {
    prop::option::of((0u32..24, 0u32..60).prop_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap()))
}

fn arb_date() -> impl Strategy<Value = Option<NaiveDate>> {
    prop::option::of((0u64..730).prop_map(|d| {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + chrono::Days::new(d)
    }))
}

/// Non-empty optional text; empty strings are normalized away on input.
fn arb_text() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[^\x00]{1,40}")
}

fn arb_task() -> impl Strategy<Value = Task> {
    (
        (arb_task_id(), "[^\x00]{1,60}", arb_text(), "[a-z]{1,10}", arb_priority()),
        (arb_date(), arb_time(), any::<bool>(), arb_instant()),
        (arb_repeat(), any::<bool>(), arb_text(), prop::option::of(arb_task_id())),
    )
        .prop_map(
            |(
                (id, title, description, category, priority),
                (date, time, completed, created_at),
                (repeat, reminder, tags, original_id),
            )| {
                let pattern = original_id.as_ref().map(|_| repeat);
                Task {
                    id,
                    title,
                    description,
                    category: CategoryId::new(category),
                    priority,
                    date,
                    time,
                    completed,
                    completed_at: completed.then_some(created_at),
                    created_at,
                    day: Day::default(),
                    repeat,
                    reminder,
                    tags,
                    is_recurring: original_id.is_some(),
                    original_id,
                    pattern,
                }
            },
        )
}

fn arb_week() -> impl Strategy<Value = WeekTasks> {
    prop::collection::vec((arb_day(), arb_task()), 0..24).prop_map(|entries| {
        let mut week = WeekTasks::new();
        for (day, mut task) in entries {
            task.day = day;
            week.day_mut(day).push(task);
        }
        week
    })
}

// --- Properties ---

proptest! {
    #[test]
    fn bundle_decode_never_panics(input in ".*") {
        let _ = bundle::decode(&input);
    }

    #[test]
    fn week_decode_never_panics(input in ".*") {
        let _ = serde_json::from_str::<WeekTasks>(&input);
    }

    #[test]
    fn bundle_decode_never_panics_on_objects(
        tasks in prop_oneof![Just("{}"), Just("[]"), Just("null"), Just("1"), Just(r#"{"9": []}"#)],
        categories in prop_oneof![Just("[]"), Just("{}"), Just("null"), Just(r#"[{"id": 1}]"#)],
    ) {
        let doc = format!(r#"{{"tasks": {tasks}, "categories": {categories}}}"#);
        let _ = bundle::decode(&doc);
    }

    #[test]
    fn week_survives_store_and_load(week in arb_week()) {
        let json = serde_json::to_string(&week).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(value.as_object().unwrap().len(), 7);

        let back: WeekTasks = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(&back, &week);
        for (day, tasks) in back.iter() {
            prop_assert!(tasks.iter().all(|t| t.day == day));
        }
    }

    #[test]
    fn misfiled_days_are_normalized(week in arb_week(), wrong in arb_day()) {
        let mut value = serde_json::to_value(&week).unwrap();
        for bucket in value.as_object_mut().unwrap().values_mut() {
            for task in bucket.as_array_mut().unwrap() {
                task["day"] = serde_json::json!(wrong.index());
            }
        }
        let back: WeekTasks = serde_json::from_value(value).unwrap();
        prop_assert_eq!(back.len(), week.len());
        for (day, tasks) in back.iter() {
            prop_assert!(tasks.iter().all(|t| t.day == day));
        }
    }

    #[test]
    fn exported_bundle_decodes_to_itself(week in arb_week(), stamp in arb_instant()) {
        let original = Bundle::new(week, Category::defaults(), Vec::new(), stamp);
        let json = bundle::encode(&original).unwrap();
        prop_assert_eq!(bundle::decode(&json).unwrap(), original);
    }
}
