//! Seven day buckets of tasks.
//!
//! Serialized as a JSON object keyed `"0"`..`"6"`. Decoding also accepts a
//! plain array of seven arrays, tolerates missing days (they come back
//! empty) and drops keys that are not day indices.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::day::Day;
use crate::task::{Task, TaskId};

/// The week's tasks, one ordered bucket per [`Day`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekTasks {
    days: [Vec<Task>; 7],
}

impl WeekTasks {
    /// Seven empty buckets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks in one bucket, in insertion order.
    #[must_use]
    pub fn day(&self, day: Day) -> &[Task] {
        &self.days[day.index()]
    }

    /// Mutable access to one bucket.
    pub fn day_mut(&mut self, day: Day) -> &mut Vec<Task> {
        &mut self.days[day.index()]
    }

    /// `(day, tasks)` for all seven buckets, Sunday first.
    pub fn iter(&self) -> impl Iterator<Item = (Day, &[Task])> {
        Day::ALL.into_iter().map(|d| (d, self.day(d)))
    }

    /// Every task across the week, bucket by bucket.
    pub fn all(&self) -> impl Iterator<Item = &Task> {
        self.days.iter().flatten()
    }

    /// Total number of tasks in all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.iter().map(Vec::len).sum()
    }

    /// Whether all seven buckets are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Vec::is_empty)
    }

    /// Finds a task by id in one bucket.
    #[must_use]
    pub fn find(&self, day: Day, id: &TaskId) -> Option<&Task> {
        self.day(day).iter().find(|t| t.id == *id)
    }

    /// Finds a task by id in one bucket, mutably.
    pub fn find_mut(&mut self, day: Day, id: &TaskId) -> Option<&mut Task> {
        self.day_mut(day).iter_mut().find(|t| t.id == *id)
    }

    /// Finds the bucket holding `id`, searching the whole week.
    #[must_use]
    pub fn locate(&self, id: &TaskId) -> Option<Day> {
        self.iter()
            .find(|(_, tasks)| tasks.iter().any(|t| t.id == *id))
            .map(|(day, _)| day)
    }

    /// Rewrites every task's `day` field to the bucket holding it.
    fn normalize(&mut self) {
        for day in Day::ALL {
            for task in self.day_mut(day) {
                if task.day != day {
                    tracing::debug!(task_id = %task.id, stored = %task.day, bucket = %day, "normalizing task day");
                    task.day = day;
                }
            }
        }
    }
}

impl Serialize for WeekTasks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let map: BTreeMap<String, &Vec<Task>> = Day::ALL
            .into_iter()
            .map(|d| (d.index().to_string(), &self.days[d.index()]))
            .collect();
        map.serialize(serializer)
    }
}

/// Accepted document shapes for the task buckets.
#[derive(Deserialize)]
#[serde(untagged)]
enum WeekDocument {
    Keyed(BTreeMap<String, Vec<Task>>),
    Listed(Vec<Vec<Task>>),
}

impl<'de> Deserialize<'de> for WeekTasks {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut week = Self::new();
        match WeekDocument::deserialize(deserializer)? {
            WeekDocument::Keyed(map) => {
                for (key, tasks) in map {
                    match key.parse::<u8>().ok().and_then(|i| Day::new(i).ok()) {
                        Some(day) => *week.day_mut(day) = tasks,
                        None => tracing::warn!(key = %key, "ignoring unknown day bucket"),
                    }
                }
            }
            WeekDocument::Listed(list) => {
                for (day, tasks) in Day::ALL.into_iter().zip(list) {
                    *week.day_mut(day) = tasks;
                }
            }
        }
        week.normalize();
        Ok(week)
    }
}
