//! Weekday bucket index.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Full English day names, indexed from Sunday.
const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// A weekday bucket, `0` = Sunday through `6` = Saturday.
///
/// Serialized as its bare index so persisted documents stay compatible
/// with the `day` field of the export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Day(u8);

/// Errors produced when building a [`Day`] from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DayError {
    /// Index outside `0..=6`.
    #[error("day index out of range: {0} (expected 0..=6)")]
    OutOfRange(u8),
    /// Not a recognised day name.
    #[error("unknown day: {0}")]
    UnknownName(String),
}

impl Day {
    pub const SUNDAY: Self = Self(0);
    pub const MONDAY: Self = Self(1);
    pub const TUESDAY: Self = Self(2);
    pub const WEDNESDAY: Self = Self(3);
    pub const THURSDAY: Self = Self(4);
    pub const FRIDAY: Self = Self(5);
    pub const SATURDAY: Self = Self(6);

    /// All seven days in bucket order.
    pub const ALL: [Self; 7] = [
        Self::SUNDAY,
        Self::MONDAY,
        Self::TUESDAY,
        Self::WEDNESDAY,
        Self::THURSDAY,
        Self::FRIDAY,
        Self::SATURDAY,
    ];

    /// Monday through Friday.
    pub const WEEKDAYS: [Self; 5] = [
        Self::MONDAY,
        Self::TUESDAY,
        Self::WEDNESDAY,
        Self::THURSDAY,
        Self::FRIDAY,
    ];

    /// Creates a day from its bucket index.
    ///
    /// # Errors
    ///
    /// Returns [`DayError::OutOfRange`] if `index > 6`.
    pub const fn new(index: u8) -> Result<Self, DayError> {
        if index < 7 {
            Ok(Self(index))
        } else {
            Err(DayError::OutOfRange(index))
        }
    }

    /// The day a calendar date falls on.
    #[must_use]
    pub fn of_date(date: NaiveDate) -> Self {
        Self::from(date.weekday())
    }

    /// Bucket index, `0..=6`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Full English name ("Sunday").
    #[must_use]
    pub const fn name(self) -> &'static str {
        DAY_NAMES[self.0 as usize]
    }

    /// Three-letter name ("Sun").
    #[must_use]
    pub fn short_name(self) -> &'static str {
        &DAY_NAMES[self.0 as usize][..3]
    }
}

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Self {
        // num_days_from_sunday is always 0..=6
        #[allow(clippy::cast_possible_truncation)]
        Self(weekday.num_days_from_sunday() as u8)
    }
}

impl Default for Day {
    fn default() -> Self {
        Self::SUNDAY
    }
}

impl TryFrom<u8> for Day {
    type Error = DayError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Day> for u8 {
    fn from(day: Day) -> Self {
        day.0
    }
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Day {
    type Err = DayError;

    /// Accepts a bucket index (`"3"`) or an English day name, full or
    /// three-letter, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<u8>() {
            return Self::new(index);
        }
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| {
                d.name().eq_ignore_ascii_case(name) || d.short_name().eq_ignore_ascii_case(name)
            })
            .ok_or_else(|| DayError::UnknownName(name.to_string()))
    }
}
