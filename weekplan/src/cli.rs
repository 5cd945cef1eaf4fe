//! Command-line front end: subcommands and their plain-text output.
//!
//! [`execute`] runs one subcommand against a [`Planner`] and writes the
//! result to any [`Write`] sink, so commands can be exercised without a
//! terminal. `watch` needs the async runtime and is driven by the binary.

use std::io::Write;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};

use weekplan_model::task::clock_time;
use weekplan_model::{
    CategoryDraft, CategoryId, GoalId, Priority, RepeatPattern, Task, TaskDraft, TaskId, TaskPatch,
};

use crate::backup::{self, BackupError};
use crate::categories::CategoryError;
use crate::goals::GoalError;
use crate::planner::Planner;
use crate::storage::KeyValueStore;
use crate::tasks::{SortOrder, TaskError};

/// Errors surfaced to the user by a subcommand.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error(transparent)]
    Goal(#[from] GoalError),
    #[error(transparent)]
    Backup(#[from] BackupError),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
    /// `edit` was called without any field to change.
    #[error("nothing to change: pass at least one field to edit")]
    EmptyPatch,
    /// The command has to be run by the binary's async loop.
    #[error("`{0}` cannot run here")]
    NeedsRuntime(&'static str),
}

/// Subcommands. Without one, `list` runs.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a task to the selected day.
    Add(AddArgs),
    /// Edit a task in the selected day.
    Edit(EditArgs),
    /// Toggle a task between done and open.
    Done {
        /// Task id.
        id: TaskId,
    },
    /// Delete a task.
    Rm {
        /// Task id.
        id: TaskId,
    },
    /// Show the selected day's tasks.
    List,
    /// Show totals for the week.
    Stats,
    /// Show per-day completion for the week.
    Week,
    /// Manage categories.
    #[command(subcommand)]
    Category(CategoryCommand),
    /// Manage weekly goals.
    #[command(subcommand)]
    Goal(GoalCommand),
    /// Write a backup of all data (`-` for stdout).
    Export {
        /// Output file (default: `backup-tasks-YYYY-MM-DD.json`).
        path: Option<PathBuf>,
    },
    /// Replace all data with a backup file.
    Import {
        /// Backup file to read.
        path: PathBuf,
    },
    /// Stay running and deliver reminders until interrupted.
    Watch,
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct AddArgs {
    /// Task title.
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    /// Category id (default: the first category).
    #[arg(short = 'C', long)]
    pub category: Option<String>,
    #[arg(short, long, default_value_t = Priority::Medium)]
    pub priority: Priority,
    /// Due date, `YYYY-MM-DD`.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Start time, `HH:MM`.
    #[arg(long, value_parser = parse_time)]
    pub time: Option<NaiveTime>,
    /// none, daily, weekly, weekdays or monthly.
    #[arg(short, long, default_value_t = RepeatPattern::None)]
    pub repeat: RepeatPattern,
    /// Notify when the task starts (needs `--date` and `--time`).
    #[arg(long)]
    pub reminder: bool,
    /// Comma-separated tags.
    #[arg(long)]
    pub tags: Option<String>,
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct EditArgs {
    /// Task id.
    pub id: TaskId,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,
    #[arg(long)]
    pub clear_description: bool,
    #[arg(short = 'C', long)]
    pub category: Option<String>,
    #[arg(short, long)]
    pub priority: Option<Priority>,
    #[arg(long, conflicts_with = "clear_date")]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub clear_date: bool,
    #[arg(long, value_parser = parse_time, conflicts_with = "clear_time")]
    pub time: Option<NaiveTime>,
    #[arg(long)]
    pub clear_time: bool,
    #[arg(short, long)]
    pub repeat: Option<RepeatPattern>,
    /// `true` or `false`.
    #[arg(long)]
    pub reminder: Option<bool>,
    #[arg(long, conflicts_with = "clear_tags")]
    pub tags: Option<String>,
    #[arg(long)]
    pub clear_tags: bool,
}

impl EditArgs {
    /// The fields to change, as a patch.
    #[must_use]
    pub fn to_patch(&self) -> TaskPatch {
        fn field<T: Clone>(value: Option<&T>, clear: bool) -> Option<Option<T>> {
            if clear { Some(None) } else { value.cloned().map(Some) }
        }
        TaskPatch {
            title: self.title.clone(),
            description: field(self.description.as_ref(), self.clear_description),
            category: self.category.as_deref().map(CategoryId::from),
            priority: self.priority,
            date: field(self.date.as_ref(), self.clear_date),
            time: field(self.time.as_ref(), self.clear_time),
            repeat: self.repeat,
            reminder: self.reminder,
            tags: field(self.tags.as_ref(), self.clear_tags),
        }
    }
}

#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CategoryCommand {
    /// Create a category.
    Add {
        name: String,
        /// Display color, `#rrggbb`.
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Delete a category. Its tasks are kept.
    Rm { id: String },
    /// List categories with their task counts.
    List,
}

#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum GoalCommand {
    /// Create a goal.
    Add { text: String },
    /// Toggle a goal between done and open.
    Toggle { id: GoalId },
    /// Set a goal's progress (clamped to its target).
    Progress { id: GoalId, value: u32 },
    /// List goals.
    List,
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    clock_time::parse(s).ok_or_else(|| format!("invalid time `{s}`, expected HH:MM"))
}

/// Runs `command` against `planner`, writing output to `out`.
///
/// When `day_pinned` is false, commands that address a task by id first
/// switch to the day holding it, so `done <id>` works from any day.
///
/// # Errors
///
/// Returns [`CliError`] when the planner rejects the operation, a backup
/// file cannot be read or written, or `out` fails.
pub fn execute<S, W>(
    planner: &mut Planner<S>,
    command: Command,
    day_pinned: bool,
    out: &mut W,
) -> Result<(), CliError>
where
    S: KeyValueStore,
    W: Write,
{
    match command {
        Command::Add(args) => {
            let category = args.category.map_or_else(
                || planner.resolve_category(&CategoryId::default()).id,
                CategoryId::new,
            );
            let draft = TaskDraft {
                title: args.title,
                description: args.description,
                category,
                priority: args.priority,
                date: args.date,
                time: args.time,
                repeat: args.repeat,
                reminder: args.reminder,
                tags: args.tags,
            };
            let task = planner.add_task(draft)?;
            writeln!(out, "Added to {}: {}", task.day, task.id)?;
        }
        Command::Edit(args) => {
            let patch = args.to_patch();
            if patch.is_empty() {
                return Err(CliError::EmptyPatch);
            }
            focus_task(planner, &args.id, day_pinned);
            let task = planner.update_task(&args.id, patch)?;
            writeln!(out, "Updated: {}", render_task(planner, &task))?;
        }
        Command::Done { id } => {
            focus_task(planner, &id, day_pinned);
            let task = planner.toggle_task(&id)?;
            let state = if task.completed { "done" } else { "reopened" };
            writeln!(out, "{state}: {}", task.title)?;
        }
        Command::Rm { id } => {
            focus_task(planner, &id, day_pinned);
            let task = planner.delete_task(&id)?;
            writeln!(out, "Deleted: {}", task.title)?;
        }
        Command::List => list(planner, out)?,
        Command::Stats => {
            let stats = planner.stats();
            writeln!(
                out,
                "Total: {}  Completed: {}  Pending: {}  Productivity: {}%  Today: {}",
                stats.total, stats.completed, stats.pending, stats.productivity, stats.today
            )?;
        }
        Command::Week => {
            for row in planner.week_overview() {
                let marker = if row.day == planner.selected_day() { '>' } else { ' ' };
                writeln!(
                    out,
                    "{marker} {:<3}  {:>2}/{:<2}  {:>3}%",
                    row.day.short_name(),
                    row.completed,
                    row.total,
                    row.rate
                )?;
            }
        }
        Command::Category(action) => category(planner, action, out)?,
        Command::Goal(action) => goal(planner, action, out)?,
        Command::Export { path } => {
            let json = planner.export_json()?;
            match path {
                Some(p) if p.as_os_str() == "-" => writeln!(out, "{json}")?,
                path => {
                    let path = path.unwrap_or_else(|| {
                        PathBuf::from(backup::default_file_name(planner.today()))
                    });
                    backup::write_file(&path, &json)?;
                    writeln!(out, "Exported to {}", path.display())?;
                }
            }
        }
        Command::Import { path } => {
            let json = backup::read_file(&path)?;
            let summary = planner.import_json(&json)?;
            writeln!(
                out,
                "Imported {} tasks, {} categories, {} goals",
                summary.tasks, summary.categories, summary.goals
            )?;
            if !summary.persisted {
                writeln!(out, "warning: not everything could be saved")?;
            }
        }
        Command::Watch => return Err(CliError::NeedsRuntime("watch")),
    }
    Ok(())
}

fn focus_task<S: KeyValueStore>(planner: &mut Planner<S>, id: &TaskId, day_pinned: bool) {
    if day_pinned {
        return;
    }
    if let Some(day) = planner.tasks().locate(id) {
        planner.switch_to_day(day);
    }
}

fn list<S: KeyValueStore, W: Write>(planner: &Planner<S>, out: &mut W) -> Result<(), CliError> {
    let counts = planner.day_counts();
    let order = match planner.sort_order() {
        SortOrder::Newest => "newest first",
        SortOrder::Oldest => "oldest first",
    };
    writeln!(
        out,
        "{}: {} tasks, {} pending, {} done ({}, {order})",
        planner.selected_day(),
        counts.all,
        counts.pending,
        counts.completed,
        planner.filter()
    )?;
    let tasks = planner.filtered_tasks();
    if tasks.is_empty() {
        writeln!(out, "  nothing here")?;
    }
    for task in tasks {
        writeln!(out, "  {}", render_task(planner, task))?;
    }
    Ok(())
}

fn render_task<S: KeyValueStore>(planner: &Planner<S>, task: &Task) -> String {
    let mut line = format!(
        "[{}] {:<6} {} ({})",
        if task.completed { 'x' } else { ' ' },
        task.priority.label(),
        task.title,
        planner.resolve_category(&task.category).name
    );
    if let Some(date) = task.date {
        line.push_str(&format!(" {date}"));
    }
    if let Some(time) = task.time {
        line.push_str(&format!(" {}", clock_time::format(time)));
    }
    if task.repeat != RepeatPattern::None {
        line.push_str(&format!(" [{}]", task.repeat));
    }
    for tag in task.tag_list() {
        line.push_str(&format!(" #{tag}"));
    }
    line.push_str(&format!("  {}", task.id));
    line
}

fn category<S: KeyValueStore, W: Write>(
    planner: &mut Planner<S>,
    action: CategoryCommand,
    out: &mut W,
) -> Result<(), CliError> {
    match action {
        CategoryCommand::Add { name, color, icon } => {
            let mut draft = CategoryDraft::named(name);
            if let Some(color) = color {
                draft.color = color;
            }
            if let Some(icon) = icon {
                draft.icon = icon;
            }
            let category = planner.add_category(draft)?;
            writeln!(out, "Added category {} ({})", category.name, category.id)?;
        }
        CategoryCommand::Rm { id } => {
            let id = CategoryId::from(id.as_str());
            let category = planner.delete_category(&id)?;
            let orphaned = planner.category_task_count(&id);
            writeln!(out, "Deleted category {}", category.name)?;
            if orphaned > 0 {
                writeln!(out, "{orphaned} tasks still reference it")?;
            }
        }
        CategoryCommand::List => {
            for category in planner.categories() {
                writeln!(
                    out,
                    "{:<14} {:<14} {}  {} tasks",
                    category.id,
                    category.name,
                    category.color,
                    planner.category_task_count(&category.id)
                )?;
            }
        }
    }
    Ok(())
}

fn goal<S: KeyValueStore, W: Write>(
    planner: &mut Planner<S>,
    action: GoalCommand,
    out: &mut W,
) -> Result<(), CliError> {
    match action {
        GoalCommand::Add { text } => {
            let goal = planner.add_goal(&text)?;
            writeln!(out, "Added goal {}", goal.id)?;
        }
        GoalCommand::Toggle { id } => {
            let goal = planner.toggle_goal(&id)?;
            writeln!(out, "{}: {}/{}", goal.text, goal.current, goal.target)?;
        }
        GoalCommand::Progress { id, value } => {
            let goal = planner.update_goal_progress(&id, value)?;
            writeln!(out, "{}: {}/{}", goal.text, goal.current, goal.target)?;
        }
        GoalCommand::List => {
            for goal in planner.goals() {
                writeln!(
                    out,
                    "[{}] {} {}/{}  {}",
                    if goal.completed { 'x' } else { ' ' },
                    goal.text,
                    goal.current,
                    goal.target,
                    goal.id
                )?;
            }
        }
    }
    Ok(())
}
