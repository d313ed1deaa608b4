use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use rollcall_core::snapshot::default_export_name;
use rollcall_core::{process_scan, Config, RosterFilter, Role, RosterStore, ScanDebouncer, Stats};

use crate::output;
use crate::Command;

pub async fn run(command: Command, store: &RosterStore, config: &Config) -> Result<()> {
    match command {
        Command::Init => {
            println!("Roster: {} ({} people)", store.location(), store.len());
        }
        Command::Scan { code } => {
            let outcome = process_scan(store, &code);
            println!("{}", output::outcome_line(&outcome));
            if outcome.is_success() {
                store.save()?;
            }
        }
        Command::Watch => watch(store, config).await?,
        Command::Add { code, name, role } => {
            let person = store.add_person(&code, &name, role)?;
            store.save()?;
            println!("Added {} ({}, {})", person.name, person.code, person.role);
        }
        Command::Edit { code, name, role } => {
            let person = store.update_person(&code, name.as_deref(), role)?;
            store.save()?;
            println!("Updated {}: {} ({})", person.code, person.name, person.role);
        }
        Command::Delete { code } => match store.delete_person(&code) {
            Some(person) => {
                store.save()?;
                println!("Deleted {} ({})", person.name, person.code);
            }
            None => println!("No one with code {}; nothing to delete", code),
        },
        Command::List {
            status,
            role,
            search,
            json,
        } => {
            let filter = RosterFilter {
                presence: status,
                role,
                search,
            };
            let people = store.filter(&filter);
            if json {
                println!("{}", serde_json::to_string_pretty(&people)?);
            } else {
                print!("{}", output::people_table(&people));
            }
        }
        Command::Stats { json } => {
            let stats = store.all_stats();
            if json {
                println!("{}", stats_json(&stats)?);
            } else {
                print!("{}", output::stats_table(&stats));
            }
        }
        Command::NewDay => {
            let summary = store.rollover();
            store.save()?;
            println!(
                "New day started: {} absences recorded, {} attendees reset",
                summary.absences_recorded, summary.presence_cleared
            );
        }
        Command::ResetAbsences => {
            store.reset_absences();
            store.save()?;
            println!("All absence counts reset to 0");
        }
        Command::Export { path } => {
            let path = path.unwrap_or_else(|| {
                PathBuf::from(default_export_name(chrono::Local::now().date_naive()))
            });
            export(store, &path)?;
            println!("Exported {} people to {}", store.len(), path.display());
        }
        Command::Import { path } => {
            let data = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let count = store
                .import_snapshot(&data)
                .with_context(|| format!("Rejected {}", path.display()))?;
            store.save()?;
            println!("Imported {} people from {}", count, path.display());
        }
        Command::Reload => {
            // Never writes back: a reload only replaces memory.
            if store.reload()? {
                println!("Reloaded {} people from {}", store.len(), store.location());
            } else {
                println!("No saved roster found; keeping current data");
            }
        }
    }
    Ok(())
}

fn stats_json(stats: &[(Role, Stats)]) -> Result<String> {
    let by_role: BTreeMap<String, Stats> = stats
        .iter()
        .map(|(role, s)| (role.to_string(), *s))
        .collect();
    Ok(serde_json::to_string_pretty(&by_role)?)
}

fn export(store: &RosterStore, path: &Path) -> Result<()> {
    let data = store.export_snapshot()?;
    std::fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Counts from one run of the scan feed.
#[derive(Debug, Default, PartialEq, Eq)]
struct FeedSummary {
    accepted: usize,
    dropped: usize,
    /// A successful scan has not yet been written to the backend.
    unsaved: bool,
}

/// Continuous feed: one code per line on stdin until EOF.
async fn watch(store: &RosterStore, config: &Config) -> Result<()> {
    let mut debouncer = ScanDebouncer::new(config.dedupe_window());
    let autosave = config.autosave();

    info!(window_ms = debouncer.window().as_millis() as u64, autosave, "Watching stdin for scans");

    let stdin = BufReader::new(tokio::io::stdin());
    let summary = run_feed(store, &mut debouncer, autosave, stdin, &mut io::stdout()).await?;
    debug!(accepted = summary.accepted, dropped = summary.dropped, "Scan feed ended");

    if summary.unsaved {
        store.save()?;
    }
    Ok(())
}

/// Process every line of `reader` as a scan. A failed autosave does not
/// end the feed; it is reported and left for the next save to retry.
async fn run_feed<R, W>(
    store: &RosterStore,
    debouncer: &mut ScanDebouncer,
    autosave: bool,
    reader: R,
    out: &mut W,
) -> Result<FeedSummary>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut summary = FeedSummary::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if !debouncer.accept(&line, Instant::now()) {
            debug!(code = %line.trim(), "Dropped repeated scan");
            summary.dropped += 1;
            continue;
        }
        summary.accepted += 1;

        let outcome = process_scan(store, &line);
        writeln!(out, "{}", output::outcome_line(&outcome))?;

        if !outcome.is_success() {
            continue;
        }
        if !autosave {
            summary.unsaved = true;
            continue;
        }
        match store.save() {
            Ok(()) => summary.unsaved = false,
            Err(e) => {
                warn!(error = %e, "Failed to save after scan");
                eprintln!("Warning: {}", e);
                summary.unsaved = true;
            }
        }
    }

    Ok(summary)
}
