//! Configuration system for `weekplan`.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/weekplan/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use weekplan_model::Day;
use weekplan_model::task::MAX_TASK_TITLE_LENGTH;

use crate::cli::Command;
use crate::planner::{DEFAULT_EVENT_BUFFER, PlannerOptions};
use crate::tasks::{SortOrder, TaskFilter};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    storage: StorageFileConfig,
    planner: PlannerFileConfig,
    reminders: RemindersFileConfig,
}

/// `[storage]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StorageFileConfig {
    data_dir: Option<PathBuf>,
}

/// `[planner]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct PlannerFileConfig {
    default_filter: Option<TaskFilter>,
    default_sort: Option<SortOrder>,
    max_title_len: Option<usize>,
    event_buffer: Option<usize>,
}

/// `[reminders]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct RemindersFileConfig {
    enabled: Option<bool>,
    sweep_interval_secs: Option<u64>,
    heads_up_window_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Reminder settings used by `watch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderConfig {
    /// Whether one-shot reminders and the sweep run at all.
    pub enabled: bool,
    /// Time between heads-up sweeps.
    pub sweep_interval: Duration,
    /// How far ahead the sweep looks.
    pub heads_up_window: Duration,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sweep_interval: Duration::from_secs(60),
            heads_up_window: Duration::from_secs(60),
        }
    }
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Storage --
    /// Directory holding the JSON documents.
    pub data_dir: PathBuf,

    // -- Planner --
    /// Filter the list view starts with.
    pub default_filter: TaskFilter,
    /// Creation-time direction the list view starts with.
    pub default_sort: SortOrder,
    /// Maximum task title length in characters.
    pub max_title_len: usize,
    /// Capacity of the planner event channel.
    pub event_buffer: usize,

    // -- Reminders --
    pub reminders: ReminderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_filter: TaskFilter::All,
            default_sort: SortOrder::Newest,
            max_title_len: MAX_TASK_TITLE_LENGTH,
            event_buffer: DEFAULT_EVENT_BUFFER,
            reminders: ReminderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an
    /// error. Otherwise the default path (`~/.config/weekplan/config.toml`)
    /// is tried and silently ignored if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Configuration from CLI args and defaults only, ignoring any file.
    #[must_use]
    pub fn from_cli(cli: &CliArgs) -> Self {
        Self::resolve(cli, &ConfigFile::default())
    }

    /// Resolve an `AppConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default. Separated from `load()` to enable
    /// unit testing without CLI parsing.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            data_dir: cli
                .data_dir
                .clone()
                .or_else(|| file.storage.data_dir.clone())
                .unwrap_or(defaults.data_dir),
            default_filter: cli
                .filter
                .or(file.planner.default_filter)
                .unwrap_or(defaults.default_filter),
            default_sort: cli
                .sort
                .or(file.planner.default_sort)
                .unwrap_or(defaults.default_sort),
            max_title_len: file
                .planner
                .max_title_len
                .filter(|&n| n > 0)
                .unwrap_or(defaults.max_title_len),
            event_buffer: file
                .planner
                .event_buffer
                .unwrap_or(defaults.event_buffer),
            reminders: ReminderConfig {
                enabled: !cli.no_reminders
                    && file
                        .reminders
                        .enabled
                        .unwrap_or(defaults.reminders.enabled),
                sweep_interval: file
                    .reminders
                    .sweep_interval_secs
                    .filter(|&s| s > 0)
                    .map_or(defaults.reminders.sweep_interval, Duration::from_secs),
                heads_up_window: file
                    .reminders
                    .heads_up_window_secs
                    .filter(|&s| s > 0)
                    .map_or(defaults.reminders.heads_up_window, Duration::from_secs),
            },
        }
    }

    /// Planner construction settings derived from this configuration.
    #[must_use]
    pub const fn planner_options(&self) -> PlannerOptions {
        PlannerOptions {
            default_filter: self.default_filter,
            default_sort: self.default_sort,
            max_title_len: self.max_title_len,
            event_buffer: self.event_buffer,
        }
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Local-first weekly task planner")]
pub struct CliArgs {
    /// Day to act on (0-6, or a name like `mon`); defaults to today.
    #[arg(short, long, global = true)]
    pub day: Option<Day>,

    /// Path to config file (default: `~/.config/weekplan/config.toml`).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the planner's data files.
    #[arg(long, env = "WEEKPLAN_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Initial list filter (all, pending, completed, today).
    #[arg(long, global = true)]
    pub filter: Option<TaskFilter>,

    /// Initial creation-time order (newest, oldest).
    #[arg(long, global = true)]
    pub sort: Option<SortOrder>,

    /// Disable reminders in `watch`.
    #[arg(long, global = true)]
    pub no_reminders: bool,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "WEEKPLAN_LOG", global = true)]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/weekplan.log`).
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// `<platform data dir>/weekplan`, or `./.weekplan` when there is none.
fn default_data_dir() -> PathBuf {
    dirs::data_dir().map_or_else(|| PathBuf::from(".weekplan"), |d| d.join("weekplan"))
}

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("weekplan").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
