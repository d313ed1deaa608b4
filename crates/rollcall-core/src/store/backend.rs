use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::{AttendanceError, Result};

/// Roster file name inside the data directory
pub const ROSTER_FILE: &str = "roster.json";

/// Where a serialized snapshot lives between runs.
pub trait SnapshotBackend: Send + Sync {
    /// Read the stored snapshot, or `None` if nothing was ever written.
    fn read(&self) -> Result<Option<String>>;

    /// Replace the stored snapshot with `contents`.
    fn write(&self, contents: &str) -> Result<()>;

    /// Human-readable location, for logs and the CLI.
    fn describe(&self) -> String;
}

pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backend for `roster.json` inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(ROSTER_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_temp(&self, temp: &Path, contents: &str) -> std::io::Result<()> {
        let file = File::create(temp)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    }
}

impl SnapshotBackend for JsonFileBackend {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            AttendanceError::persistence(format!("read {}", self.path.display()), e)
        })?;
        debug!(path = %self.path.display(), bytes = contents.len(), "Read roster snapshot");
        Ok(Some(contents))
    }

    fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AttendanceError::persistence(format!("create {}", parent.display()), e)
            })?;
        }

        // Write beside the target and rename over it, so readers only ever
        // see the old snapshot or the complete new one.
        let temp = self.temp_path();
        let result = self
            .write_temp(&temp, contents)
            .and_then(|_| fs::rename(&temp, &self.path));

        if let Err(e) = result {
            if temp.exists() {
                if let Err(cleanup) = fs::remove_file(&temp) {
                    warn!(path = %temp.display(), error = %cleanup, "Failed to remove temp snapshot");
                }
            }
            return Err(AttendanceError::persistence(
                format!("write {}", self.path.display()),
                e,
            ));
        }

        debug!(path = %self.path.display(), bytes = contents.len(), "Wrote roster snapshot");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Keeps the snapshot in memory. Reads and writes can be made to fail.
#[derive(Default)]
pub struct MemoryBackend {
    contents: Mutex<Option<String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_contents(&self, contents: Option<String>) {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = contents;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

fn simulated_failure(op: &str) -> AttendanceError {
    AttendanceError::persistence(
        format!("{} memory snapshot", op),
        std::io::Error::new(std::io::ErrorKind::Other, "simulated failure"),
    )
}

impl SnapshotBackend for MemoryBackend {
    fn read(&self) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(simulated_failure("read"));
        }
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(simulated_failure("write"));
        }
        self.set_contents(Some(contents.to_string()));
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

impl<B: SnapshotBackend + ?Sized> SnapshotBackend for std::sync::Arc<B> {
    fn read(&self) -> Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, contents: &str) -> Result<()> {
        (**self).write(contents)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
