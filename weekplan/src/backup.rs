//! Whole-state export and import.
//!
//! Export snapshots tasks, categories and goals into one JSON document.
//! Import validates the document completely before touching the planner,
//! so a rejected file leaves the current state as it was.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use weekplan_model::bundle::{self, Bundle, BundleError};

use crate::events::{PlannerEvent, Toast};
use crate::planner::Planner;
use crate::storage::KeyValueStore;

/// Errors that can occur during backup export or import.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// The document could not be encoded or was rejected on decode.
    #[error(transparent)]
    Format(#[from] BundleError),
    /// The backup file could not be read or written.
    #[error("backup file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What an import brought in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub tasks: usize,
    pub categories: usize,
    pub goals: usize,
    /// All three collections reached storage.
    pub persisted: bool,
}

/// `backup-tasks-YYYY-MM-DD.json`.
#[must_use]
pub fn default_file_name(date: NaiveDate) -> String {
    format!("backup-tasks-{}.json", date.format("%Y-%m-%d"))
}

/// Writes an encoded backup to `path`.
///
/// # Errors
///
/// Returns [`BackupError::Io`] if the file cannot be written.
pub fn write_file(path: &Path, json: &str) -> Result<(), BackupError> {
    std::fs::write(path, json).map_err(|source| BackupError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a backup document from `path`.
///
/// # Errors
///
/// Returns [`BackupError::Io`] if the file cannot be read.
pub fn read_file(path: &Path) -> Result<String, BackupError> {
    std::fs::read_to_string(path).map_err(|source| BackupError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl<S: KeyValueStore> Planner<S> {
    /// Snapshot of the current state, stamped with the current time.
    #[must_use]
    pub fn export_bundle(&self) -> Bundle {
        Bundle::new(
            self.tasks.week().clone(),
            self.categories.all().to_vec(),
            self.goals.all().to_vec(),
            self.clock.now(),
        )
    }

    /// The current state as a pretty-printed backup document.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Format`] if serialization fails.
    pub fn export_json(&self) -> Result<String, BackupError> {
        let json = bundle::encode(&self.export_bundle())?;
        tracing::info!(bytes = json.len(), "state exported");
        self.events.toast(Toast::success("Data exported successfully"));
        Ok(json)
    }

    /// Replaces all three collections with the contents of `json`.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Format`] if the document is not valid JSON,
    /// lacks `tasks` or `categories`, or has a malformed section. The
    /// planner is unchanged in that case.
    pub fn import_json(&mut self, json: &str) -> Result<ImportSummary, BackupError> {
        let incoming = match bundle::decode(json) {
            Ok(bundle) => bundle,
            Err(err) => {
                tracing::warn!(error = %err, "import rejected");
                self.events.toast(Toast::error("Invalid or corrupted file"));
                return Err(err.into());
            }
        };

        let summary_counts = (
            incoming.tasks.len(),
            incoming.categories.len(),
            incoming.goals.len(),
        );
        self.tasks.replace(incoming.tasks);
        self.categories.replace(incoming.categories);
        self.goals.replace(incoming.goals);

        // Write all three even if one fails.
        let persisted = [
            self.persist_tasks(),
            self.persist_categories(),
            self.persist_goals(),
        ]
        .into_iter()
        .all(|ok| ok);

        let (tasks, categories, goals) = summary_counts;
        tracing::info!(
            tasks,
            categories,
            goals,
            version = incoming.version.as_deref().unwrap_or("unknown"),
            "state imported"
        );
        self.events.emit(PlannerEvent::TasksChanged);
        self.events.emit(PlannerEvent::CategoriesChanged);
        self.events.emit(PlannerEvent::GoalsChanged);
        self.events.toast(Toast::success("Data imported successfully"));

        Ok(ImportSummary {
            tasks,
            categories,
            goals,
            persisted,
        })
    }
}
