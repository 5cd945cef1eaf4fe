//! Local persistence of the three planner documents.
//!
//! Defines the [`KeyValueStore`] trait for durable string storage, a
//! file-backed and an in-memory implementation, and [`Storage`], which
//! maps the task buckets, categories and goals onto fixed keys.
//!
//! Loading never fails: a missing document yields its default and a
//! corrupt one is logged and replaced by its default. Saving returns an
//! error so the caller can surface it; see `Planner` for how failures are
//! reported without rolling back the in-memory state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;

use weekplan_model::{Category, Goal, WeekTasks};

/// Key holding the seven task buckets.
pub const TASKS_KEY: &str = "weekly_tasks_v2";
/// Key holding the category list.
pub const CATEGORIES_KEY: &str = "task_categories";
/// Key holding the goal list.
pub const GOALS_KEY: &str = "weekly_goals";

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        /// File that was accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A document could not be serialized.
    #[error("failed to serialize {key}: {source}")]
    Serialize {
        /// Key being written.
        key: &'static str,
        /// Underlying serde error.
        source: serde_json::Error,
    },

    /// The backend refused the write (quota, read-only, ...).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable string storage addressed by key.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value; `Ok(None)` when the key was never written.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the value could not be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One JSON file per key inside a data directory.
///
/// Writes go to `<key>.json.tmp` first and are renamed into place, so a
/// crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (and creates if needed) the data directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
        tracing::debug!(dir = %dir.display(), "opened file store");
        Ok(Self { dir })
    }

    /// The data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)
            .and_then(|()| std::fs::rename(&tmp, &path))
            .map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
        tracing::trace!(path = %path.display(), bytes = value.len(), "wrote document");
        Ok(())
    }
}

/// In-memory implementation of [`KeyValueStore`] for testing and
/// throwaway sessions. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create a new, empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw value, bypassing serialization.
    pub fn insert_raw(&self, key: &str, value: impl Into<String>) {
        self.entries.lock().insert(key.to_string(), value.into());
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Typed access to the planner documents over a [`KeyValueStore`].
#[derive(Debug)]
pub struct Storage<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> Storage<S> {
    /// Wraps a backend.
    pub const fn new(backend: S) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    pub const fn backend(&self) -> &S {
        &self.backend
    }

    /// Loads the task buckets; seven empty buckets when absent or corrupt.
    pub fn load_tasks(&self) -> WeekTasks {
        self.load_or(TASKS_KEY, WeekTasks::new)
    }

    /// Loads categories; the default seed when absent or corrupt.
    pub fn load_categories(&self) -> Vec<Category> {
        self.load_or(CATEGORIES_KEY, Category::defaults)
    }

    /// Loads goals; empty when absent or corrupt.
    pub fn load_goals(&self) -> Vec<Goal> {
        self.load_or(GOALS_KEY, Vec::new)
    }

    /// Persists the task buckets.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if serialization or the write fails.
    pub fn save_tasks(&self, tasks: &WeekTasks) -> Result<(), StorageError> {
        self.save(TASKS_KEY, tasks)
    }

    /// Persists the category list.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if serialization or the write fails.
    pub fn save_categories(&self, categories: &[Category]) -> Result<(), StorageError> {
        self.save(CATEGORIES_KEY, categories)
    }

    /// Persists the goal list.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if serialization or the write fails.
    pub fn save_goals(&self, goals: &[Goal]) -> Result<(), StorageError> {
        self.save(GOALS_KEY, goals)
    }

    fn load_or<T: DeserializeOwned>(&self, key: &'static str, default: impl FnOnce() -> T) -> T {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default(),
            Err(err) => {
                tracing::warn!(key, error = %err, "could not read stored document, using defaults");
                return default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, error = %err, "stored document is corrupt, using defaults");
                default()
            }
        }
    }

    fn save<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(value).map_err(|source| StorageError::Serialize { key, source })?;
        self.backend.set(key, &json)
    }
}
