//! rollcall - daily attendance by scan code.
//!
//! A command-line front end over `rollcall-core`: scan codes one at a time
//! or as a continuous feed on stdin, manage the roster, close out the day,
//! and move snapshots in and out.

mod commands;
mod output;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rollcall_core::{Config, JsonFileBackend, Presence, Role, RosterStore};

/// Log file name prefix inside the log directory
const LOG_FILE_PREFIX: &str = "rollcall.log";

#[derive(Parser, Debug)]
#[command(name = "rollcall", version, about = "Daily attendance tracking by scan code")]
struct Cli {
    /// Directory holding roster.json (overrides config and ROLLCALL_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the roster (seeding it on first run) and show where it lives
    Init,
    /// Mark one code present
    Scan { code: String },
    /// Read codes from stdin, one per line, collapsing rapid repeats
    Watch,
    /// Enroll a new person
    Add {
        code: String,
        name: String,
        #[arg(long, default_value = "student")]
        role: Role,
    },
    /// Change a person's name or role
    Edit {
        code: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role: Option<Role>,
    },
    /// Remove a person (unknown codes are ignored)
    Delete { code: String },
    /// List the roster
    List {
        /// Only people with this status (present or absent)
        #[arg(long)]
        status: Option<Presence>,
        /// Only people with this role (student or staff)
        #[arg(long)]
        role: Option<Role>,
        /// Match names (case-insensitive) or codes
        #[arg(long, default_value = "")]
        search: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show present/absent counts per role
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Close out the day: count absences and reset everyone to absent
    NewDay,
    /// Set every absence count back to zero
    ResetAbsences,
    /// Write a snapshot of the roster
    Export {
        /// Output file (defaults to attendance_YYYY-MM-DD.json)
        path: Option<PathBuf>,
    },
    /// Replace the roster with a snapshot file
    Import { path: PathBuf },
    /// Re-read the saved roster
    Reload,
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_dir: Option<&PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let mut guard = None;
    let file_layer = log_dir.and_then(|dir| match std::fs::create_dir_all(dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, worker_guard) = tracing_appender::non_blocking(appender);
            guard = Some(worker_guard);
            Some(fmt::layer().with_writer(writer).with_ansi(false))
        }
        Err(e) => {
            eprintln!("Warning: failed to create log directory {}: {}", dir.display(), e);
            None
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(dir) = cli.log_dir {
        config.log_dir = Some(dir);
    }

    let _log_guard = init_tracing(config.log_dir.as_ref());
    info!("rollcall starting");

    let data_dir = config.data_dir()?;
    let store = RosterStore::open(JsonFileBackend::in_dir(&data_dir))
        .with_context(|| format!("Failed to open roster in {}", data_dir.display()))?;

    commands::run(cli.command, &store, &config).await
}
