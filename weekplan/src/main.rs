//! `weekplan`: local-first weekly task planner.
//!
//! Runs one subcommand against the data directory and exits, or stays up
//! in `watch` mode to deliver reminders. Configuration via CLI flags,
//! environment variables, or config file (`~/.config/weekplan/config.toml`).
//!
//! ```bash
//! # Add a task to Monday and list it
//! weekplan add "Call the bank" --day mon --time 10:00 -p high
//! weekplan list --day mon
//!
//! # Deliver reminders until Ctrl-C
//! weekplan watch
//! ```

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use weekplan::clock::SystemClock;
use weekplan::cli::{self, Command};
use weekplan::config::{AppConfig, CliArgs};
use weekplan::events::{PlannerEvent, ToastLevel};
use weekplan::reminders::{self, TracingNotifier};
use weekplan::storage::{FileStore, Storage};
use weekplan::Planner;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > config file > env > defaults).
    let config = match AppConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            AppConfig::from_cli(&cli)
        }
    };

    // Logs go to a file so command output stays clean.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(data_dir = %config.data_dir.display(), "weekplan starting");

    let store = match FileStore::open(&config.data_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let (mut planner, events) = Planner::new(
        Storage::new(store),
        Arc::new(SystemClock),
        config.planner_options(),
    );
    if let Some(day) = cli.day {
        planner.switch_to_day(day);
    }

    match cli.command.unwrap_or(Command::List) {
        Command::Watch => watch(planner, events, &config).await,
        command => run_once(&mut planner, events, command, cli.day.is_some()),
    }
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, which carries command output).
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("weekplan.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Runs a single subcommand and reports problems the planner only
/// announced as toasts (failed saves).
fn run_once(
    planner: &mut Planner<FileStore>,
    mut events: mpsc::Receiver<PlannerEvent>,
    command: Command,
    day_pinned: bool,
) -> ExitCode {
    let mut stdout = io::stdout().lock();
    let result = cli::execute(planner, command, day_pinned, &mut stdout);
    let _ = stdout.flush();

    match result {
        Ok(()) => {
            while let Ok(event) = events.try_recv() {
                if let PlannerEvent::Toast(toast) = event {
                    if matches!(toast.level, ToastLevel::Warning | ToastLevel::Error) {
                        eprintln!("{}", toast.message);
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Delivers reminders and prints toasts until Ctrl-C.
///
/// Tasks added by other `weekplan` runs are picked up on the next sweep.
async fn watch(
    planner: Planner<FileStore>,
    mut events: mpsc::Receiver<PlannerEvent>,
    config: &AppConfig,
) -> ExitCode {
    let mut planner = if config.reminders.enabled {
        planner.with_reminders(tokio::runtime::Handle::current(), Arc::new(TracingNotifier))
    } else {
        planner
    };
    let scheduled = planner.schedule_pending_reminders();
    println!(
        "Watching {} ({scheduled} reminders scheduled). Press Ctrl-C to stop.",
        planner.selected_day()
    );

    let planner = Arc::new(Mutex::new(planner));
    let sweep = config.reminders.enabled.then(|| {
        reminders::spawn_sweep(
            Arc::clone(&planner),
            config.reminders.sweep_interval,
            config.reminders.heads_up_window,
        )
    });

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(PlannerEvent::Toast(toast)) => println!("{toast}"),
                Some(_) => {}
                None => break,
            },
            result = &mut shutdown => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "failed to listen for Ctrl-C");
                }
                break;
            }
        }
    }

    if let Some(sweep) = sweep {
        sweep.abort();
    }
    tracing::info!("weekplan exiting");
    ExitCode::SUCCESS
}
