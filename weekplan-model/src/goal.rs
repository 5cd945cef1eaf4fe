//! Weekly goals with progress tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a goal (UUID v7).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalId(Uuid);

impl GoalId {
    /// Creates a new time-ordered goal identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for GoalId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GoalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GoalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A goal with a numeric target.
///
/// `completed == (current >= target)` holds after every store mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// At least 1.
    #[serde(default = "default_target", deserialize_with = "at_least_one")]
    pub target: u32,
    /// Between 0 and `target`.
    #[serde(default)]
    pub current: u32,
    pub created_at: DateTime<Utc>,
}

const fn default_target() -> u32 {
    1
}

fn at_least_one<'de, D: serde::Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    u32::deserialize(d).map(|n| n.max(1))
}

impl Goal {
    /// Progress as `current / target`, in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        f64::from(self.current.min(self.target)) / f64::from(self.target.max(1))
    }
}
