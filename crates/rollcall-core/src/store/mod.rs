//! Roster storage.
//!
//! This module provides the `RosterStore`, the single owner of the live
//! roster, together with the backends it persists snapshots through:
//! - `JsonFileBackend`: one JSON file on disk, replaced atomically
//! - `MemoryBackend`: in-process storage for tests and embedding
//!
//! Mutations never persist on their own; callers decide when to `save()`.

pub mod backend;
pub mod manager;

pub use backend::{JsonFileBackend, MemoryBackend, SnapshotBackend};
pub use manager::RosterStore;
