//! Backup document: the whole planner state in one JSON file.
//!
//! ```json
//! { "tasks": {...}, "categories": [...], "goals": [...],
//!   "exportDate": "2026-10-16T08:00:00Z", "version": "2.0" }
//! ```
//!
//! `tasks` and `categories` are required on import; `goals` defaults to
//! empty, and `exportDate` / `version` are informational.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::goal::Goal;
use crate::week::WeekTasks;

/// Version string written into every export.
pub const EXPORT_VERSION: &str = "2.0";

/// Error type for backup encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// The document is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    /// The document is valid JSON but not an object.
    #[error("backup must be a JSON object")]
    NotAnObject,
    /// A required top-level key is absent or null.
    #[error("backup is missing required key `{0}`")]
    MissingKey(&'static str),
    /// A top-level key has the wrong shape.
    #[error("backup key `{key}` is malformed: {source}")]
    Malformed {
        /// Offending key.
        key: &'static str,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// Serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// Full planner snapshot as written by export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub tasks: WeekTasks,
    pub categories: Vec<Category>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub export_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: Option<String>,
}

impl Bundle {
    /// Snapshot stamped with `exported_at` and [`EXPORT_VERSION`].
    #[must_use]
    pub fn new(
        tasks: WeekTasks,
        categories: Vec<Category>,
        goals: Vec<Goal>,
        exported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            tasks,
            categories,
            goals,
            export_date: Some(exported_at),
            version: Some(EXPORT_VERSION.to_string()),
        }
    }
}

/// Encodes a [`Bundle`] as pretty-printed JSON.
///
/// # Errors
///
/// Returns `BundleError::Serialization` if the bundle cannot be serialized.
pub fn encode(bundle: &Bundle) -> Result<String, BundleError> {
    serde_json::to_string_pretty(bundle).map_err(BundleError::Serialization)
}

/// Decodes a backup document, checking the required keys before shapes.
///
/// # Errors
///
/// Returns [`BundleError::InvalidJson`] for unparsable input,
/// [`BundleError::MissingKey`] when `tasks` or `categories` is absent, and
/// [`BundleError::Malformed`] when a key does not have the expected shape.
pub fn decode(json: &str) -> Result<Bundle, BundleError> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(BundleError::InvalidJson)?;
    let serde_json::Value::Object(mut doc) = value else {
        return Err(BundleError::NotAnObject);
    };

    let tasks = take_required(&mut doc, "tasks")?;
    let categories = take_required(&mut doc, "categories")?;
    let goals = take_optional(&mut doc, "goals")?.unwrap_or_default();
    let export_date = take_optional(&mut doc, "exportDate").unwrap_or_default();
    let version = take_optional(&mut doc, "version").unwrap_or_default();

    Ok(Bundle {
        tasks,
        categories,
        goals,
        export_date,
        version,
    })
}

type Document = serde_json::Map<String, serde_json::Value>;

fn take_required<T: serde::de::DeserializeOwned>(
    doc: &mut Document,
    key: &'static str,
) -> Result<T, BundleError> {
    take_optional(doc, key)?.ok_or(BundleError::MissingKey(key))
}

fn take_optional<T: serde::de::DeserializeOwned>(
    doc: &mut Document,
    key: &'static str,
) -> Result<Option<T>, BundleError> {
    match doc.remove(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| BundleError::Malformed { key, source }),
    }
}
