//! rollcall-core - attendance state management.
//!
//! This crate tracks daily presence for a roster of students and staff
//! identified by a scan code:
//!
//! - `models`: `Person`, `Role`, `Presence`, `Stats`, `RosterFilter`
//! - `roster`: the roster value and its rules (unique codes, rollover)
//! - `store`: `RosterStore`, the locked owner of the live roster, and the
//!   snapshot backends it persists through
//! - `scan`: classifying a submitted code into a `ScanOutcome`
//! - `snapshot`: the JSON snapshot format used for save, export and import
//! - `feed`: de-duplication for continuous scan feeds
//! - `config`: on-disk configuration

pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod roster;
pub mod scan;
pub mod snapshot;
pub mod store;

pub use config::Config;
pub use error::{AttendanceError, Result};
pub use feed::ScanDebouncer;
pub use models::{Person, Presence, Role, RosterFilter, Stats};
pub use roster::{MarkResult, RolloverSummary, Roster};
pub use scan::{process_scan, ScanOutcome, Severity};
pub use store::{JsonFileBackend, MemoryBackend, RosterStore, SnapshotBackend};
