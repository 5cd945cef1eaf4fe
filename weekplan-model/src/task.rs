//! Task model: identifiers, priorities, repeat patterns and the task record.
//!
//! Field names serialize in camelCase so that persisted documents and
//! backups keep the `createdAt` / `completedAt` / `originalId` layout of
//! the export format.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::category::CategoryId;
use crate::day::Day;

/// Maximum allowed task title length in characters.
pub const MAX_TASK_TITLE_LENGTH: usize = 256;

/// Unique identifier for a task, based on UUID v7 for time-ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Task priority, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Sort rank; larger sorts first.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Urgent => 3,
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }

    /// Display color as a hex string.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Low => "#28a745",
            Self::Medium => "#ffc107",
            Self::High => "#dc3545",
            Self::Urgent => "#c2185b",
        }
    }

    /// Priority assumed for documents that omit it or carry an unknown value.
    #[must_use]
    pub const fn lowest() -> Self {
        Self::Low
    }
}

/// New tasks default to medium priority.
impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

/// Error for unrecognised enum spellings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    /// What was being parsed ("priority", "repeat pattern").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl std::str::FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(UnknownVariant {
                kind: "priority",
                value: s.to_string(),
            }),
        }
    }
}

/// Lenient decoding: `null` or an unrecognised string becomes
/// [`Priority::lowest`], so foreign documents still load and sort last.
impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Self::lowest))
    }
}

/// How a task repeats across the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatPattern {
    /// One-off task.
    #[default]
    None,
    /// Every day of the week.
    Daily,
    /// Same weekday only.
    Weekly,
    /// Monday through Friday.
    Weekdays,
    /// Same calendar day next month.
    Monthly,
}

impl std::fmt::Display for RepeatPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Weekdays => write!(f, "weekdays"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

impl std::str::FromStr for RepeatPattern {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "weekdays" => Ok(Self::Weekdays),
            "monthly" => Ok(Self::Monthly),
            _ => Err(UnknownVariant {
                kind: "repeat pattern",
                value: s.to_string(),
            }),
        }
    }
}

/// A task in one weekday bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Soft reference into the category list; may dangle.
    pub category: CategoryId,
    #[serde(default = "Priority::lowest")]
    pub priority: Priority,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, with = "clock_time")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub completed: bool,
    /// Set iff `completed`.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Bucket owning this task.
    #[serde(default)]
    pub day: Day,
    #[serde(default)]
    pub repeat: RepeatPattern,
    #[serde(default)]
    pub reminder: bool,
    /// Comma-separated free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_recurring: bool,
    /// Task this one was cloned from by recurrence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<TaskId>,
    /// Pattern used to create this clone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<RepeatPattern>,
}

impl Task {
    /// Whether the task is dated on `date`.
    #[must_use]
    pub fn is_dated(&self, date: NaiveDate) -> bool {
        self.date == Some(date)
    }

    /// Local date and time the task starts, when both are set.
    #[must_use]
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        Some(self.date?.and_time(self.time?))
    }

    /// Individual tags, trimmed, empty entries dropped.
    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Whether this task is a recurring clone of `origin` made with `pattern`.
    #[must_use]
    pub fn is_clone_of(&self, origin: &TaskId, pattern: RepeatPattern) -> bool {
        self.original_id.as_ref() == Some(origin) && self.pattern == Some(pattern)
    }
}

/// User input for a new task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub category: CategoryId,
    pub priority: Priority,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub repeat: RepeatPattern,
    pub reminder: bool,
    pub tags: Option<String>,
}

impl TaskDraft {
    /// A draft with only a title and category; everything else default.
    #[must_use]
    pub fn new(title: impl Into<String>, category: CategoryId) -> Self {
        Self {
            title: title.into(),
            category,
            ..Self::default()
        }
    }
}

/// Partial update merged over an existing task; `None` leaves a field as is.
///
/// The doubly-optional fields distinguish "leave unchanged" (`None`) from
/// "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<CategoryId>,
    pub priority: Option<Priority>,
    pub date: Option<Option<NaiveDate>>,
    pub time: Option<Option<NaiveTime>>,
    pub repeat: Option<RepeatPattern>,
    pub reminder: Option<bool>,
    pub tags: Option<Option<String>>,
}

impl TaskPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges the provided fields over `task`.
    ///
    /// Identity, bucket and completion fields are never touched.
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(date) = self.date {
            task.date = date;
        }
        if let Some(time) = self.time {
            task.time = time;
        }
        if let Some(repeat) = self.repeat {
            task.repeat = repeat;
        }
        if let Some(reminder) = self.reminder {
            task.reminder = reminder;
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
    }
}

/// `HH:MM` wall-clock times. Seconds are written only when non-zero and
/// accepted on input.
pub mod clock_time {
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Parses `HH:MM` or `HH:MM:SS`.
    #[must_use]
    pub fn parse(s: &str) -> Option<NaiveTime> {
        let s = s.trim();
        NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .ok()
    }

    /// Formats as `HH:MM`, or `HH:MM:SS` when seconds are set.
    #[must_use]
    pub fn format(time: NaiveTime) -> String {
        if time.second() == 0 {
            time.format("%H:%M").to_string()
        } else {
            time.format("%H:%M:%S").to_string()
        }
    }

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.serialize_some(&format(*t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid time of day: {s}"))),
        }
    }
}
