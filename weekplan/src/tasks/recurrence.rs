//! Where recurring tasks get copied to.
//!
//! Recurrence is expanded eagerly: when a repeating task is added, a clone
//! is placed in every other bucket the pattern covers. Clones remember
//! their origin through `original_id` + `pattern`, which is also how
//! duplicates are detected.

use chrono::{Datelike, Days, Months, NaiveDate};

use weekplan_model::{Day, RepeatPattern, Task, TaskId};

/// Buckets a pattern covers, origin included.
///
/// `Monthly` resolves to the weekday of [`next_month`] applied to `today`,
/// independent of the task's own date.
#[must_use]
pub fn target_days(pattern: RepeatPattern, origin: Day, today: NaiveDate) -> Vec<Day> {
    match pattern {
        RepeatPattern::None => Vec::new(),
        RepeatPattern::Daily => Day::ALL.to_vec(),
        RepeatPattern::Weekly => vec![origin],
        RepeatPattern::Weekdays => Day::WEEKDAYS.to_vec(),
        RepeatPattern::Monthly => vec![Day::of_date(next_month(today))],
    }
}

/// Same day-of-month one month later, rolling overflow into the month
/// after: Jan 31 becomes Mar 3 (Mar 2 in leap years).
#[must_use]
pub fn next_month(date: NaiveDate) -> NaiveDate {
    let first = date - Days::new(u64::from(date.day0()));
    first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.checked_add_days(Days::new(u64::from(date.day0()))))
        .unwrap_or(date)
}

/// A copy of `origin` placed in `day`, tagged as a clone made by `pattern`.
#[must_use]
pub fn clone_into(origin: &Task, day: Day, pattern: RepeatPattern) -> Task {
    Task {
        id: TaskId::new(),
        day,
        is_recurring: true,
        original_id: Some(origin.id.clone()),
        pattern: Some(pattern),
        ..origin.clone()
    }
}
