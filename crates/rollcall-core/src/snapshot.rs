//! Snapshot codec.
//!
//! A snapshot is a pretty-printed JSON array of person records. The same
//! format is used for the persisted roster file, for export and for import.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{AttendanceError, Result};
use crate::models::Person;
use crate::roster::Roster;

/// Serialize people in their current order.
pub fn encode(people: &[Person]) -> Result<String> {
    serde_json::to_string_pretty(people).map_err(encode_error)
}

// Encoding our own records failing is a storage problem, not bad input.
fn encode_error(e: serde_json::Error) -> AttendanceError {
    AttendanceError::persistence("encode snapshot", e.into())
}

/// Decode and validate a whole document. Any bad record rejects the
/// entire document.
pub fn decode(data: &str) -> Result<Roster> {
    let people: Vec<Person> = serde_json::from_str(data).map_err(|e| {
        AttendanceError::MalformedInput(format!(
            "expected an array of person records: {}",
            e
        ))
    })?;
    debug!(count = people.len(), "Decoded snapshot");
    Roster::from_people(people)
}

/// File name offered for exports, e.g. `attendance_2026-10-14.json`.
pub fn default_export_name(date: NaiveDate) -> String {
    format!("attendance_{}.json", date.format("%Y-%m-%d"))
}
