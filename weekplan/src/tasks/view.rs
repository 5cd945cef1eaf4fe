//! Read-only projections over the week: filtered lists and statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use weekplan_model::{Day, Task, WeekTasks};

/// Which of the selected day's tasks to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
    /// Tasks dated today, whatever bucket is selected.
    Today,
}

impl TaskFilter {
    /// Whether `task` passes the filter.
    #[must_use]
    pub fn matches(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
            Self::Today => task.is_dated(today),
        }
    }
}

impl std::fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Today => write!(f, "today"),
        }
    }
}

impl std::str::FromStr for TaskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "completed" | "done" => Ok(Self::Completed),
            "today" => Ok(Self::Today),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

/// Creation-time ordering applied before the priority sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    /// The other direction.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Newest => Self::Oldest,
            Self::Oldest => Self::Newest,
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Newest => write!(f, "newest"),
            Self::Oldest => write!(f, "oldest"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" | "desc" => Ok(Self::Newest),
            "oldest" | "asc" => Ok(Self::Oldest),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Filters `tasks` and orders them: priority first (urgent to low), then
/// by creation time in `order`.
#[must_use]
pub fn filtered<'a>(
    tasks: &'a [Task],
    filter: TaskFilter,
    order: SortOrder,
    today: NaiveDate,
) -> Vec<&'a Task> {
    let mut out: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t, today)).collect();
    match order {
        SortOrder::Newest => out.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::Oldest => out.sort_by_key(|t| t.created_at),
    }
    // Stable, so equal priorities keep the creation order above.
    out.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank()));
    out
}

/// Rounded percentage, 0 when `total` is 0.
#[must_use]
pub const fn percent(part: usize, total: usize) -> usize {
    if total == 0 {
        0
    } else {
        (part * 200 + total) / (total * 2)
    }
}

/// Totals across all seven buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WeekStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// `completed / total` as a rounded percentage.
    pub productivity: usize,
    /// Tasks in any bucket dated today.
    pub today: usize,
}

impl WeekStats {
    #[must_use]
    pub fn compute(week: &WeekTasks, today: NaiveDate) -> Self {
        let total = week.len();
        let completed = week.all().filter(|t| t.completed).count();
        Self {
            total,
            completed,
            pending: total - completed,
            productivity: percent(completed, total),
            today: today_count(week, today),
        }
    }
}

/// Filter badge counts for the selected day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DayCounts {
    pub all: usize,
    pub pending: usize,
    pub completed: usize,
    /// Cross-day, same as [`WeekStats::today`].
    pub today: usize,
}

impl DayCounts {
    #[must_use]
    pub fn compute(week: &WeekTasks, day: Day, today: NaiveDate) -> Self {
        let tasks = week.day(day);
        let completed = tasks.iter().filter(|t| t.completed).count();
        Self {
            all: tasks.len(),
            pending: tasks.len() - completed,
            completed,
            today: today_count(week, today),
        }
    }
}

/// One row of the week overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayOverview {
    pub day: Day,
    pub total: usize,
    pub completed: usize,
    /// Completion rate as a rounded percentage.
    pub rate: usize,
}

/// Per-day totals, Sunday first.
#[must_use]
pub fn week_overview(week: &WeekTasks) -> Vec<DayOverview> {
    week.iter()
        .map(|(day, tasks)| {
            let completed = tasks.iter().filter(|t| t.completed).count();
            DayOverview {
                day,
                total: tasks.len(),
                completed,
                rate: percent(completed, tasks.len()),
            }
        })
        .collect()
}

fn today_count(week: &WeekTasks, today: NaiveDate) -> usize {
    week.all().filter(|t| t.is_dated(today)).count()
}
