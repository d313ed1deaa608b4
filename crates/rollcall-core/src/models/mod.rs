//! Data models for the attendance roster.
//!
//! - `Person`: one roster entry keyed by its scan code
//! - `Role`, `Presence`: the two enumerations carried by every entry
//! - `Stats`: per-role head count, always derived from the roster
//! - `RosterFilter`: presence/role/search criteria for listing

pub mod person;

pub use person::{Person, Presence, Role, RosterFilter, Stats};
