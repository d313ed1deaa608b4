//! Scan processing: classify one submitted code.
//!
//! Camera decodes and typed entries both end up here as plain strings.
//! Repeated submissions are harmless: the second one just comes back as
//! `AlreadyPresent`.

use std::fmt;

use tracing::{debug, info, warn};

use crate::error::AttendanceError;
use crate::models::Person;
use crate::roster::MarkResult;
use crate::store::RosterStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Marked present by this scan.
    Success(Person),
    /// Already marked earlier today; nothing changed.
    AlreadyPresent(Person),
    /// No one on the roster has this code.
    Unknown,
}

impl ScanOutcome {
    pub fn person(&self) -> Option<&Person> {
        match self {
            ScanOutcome::Success(p) | ScanOutcome::AlreadyPresent(p) => Some(p),
            ScanOutcome::Unknown => None,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ScanOutcome::Success(_) => Severity::Success,
            ScanOutcome::AlreadyPresent(_) => Severity::Warning,
            ScanOutcome::Unknown => Severity::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ScanOutcome::Success(_))
    }

    /// Message shown to the person at the scanner.
    pub fn message(&self) -> String {
        match self {
            ScanOutcome::Success(p) if p.is_staff() => format!("Welcome, {}!", p.name),
            ScanOutcome::Success(p) => format!("Attendance recorded: {}", p.name),
            ScanOutcome::AlreadyPresent(p) => format!("{} is already checked in today", p.name),
            ScanOutcome::Unknown => "Not enrolled in the system".to_string(),
        }
    }
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Trim the raw code and try to mark its owner present.
pub fn process_scan(store: &RosterStore, raw: &str) -> ScanOutcome {
    let code = raw.trim();
    match store.record_present(code) {
        Ok(MarkResult::Marked(person)) => {
            info!(code = %code, role = %person.role, "Marked present");
            ScanOutcome::Success(person)
        }
        Ok(MarkResult::AlreadyPresent(person)) => {
            debug!(code = %code, "Already present");
            ScanOutcome::AlreadyPresent(person)
        }
        Err(AttendanceError::NotFound(_)) => {
            debug!(code = %code, "Unknown code scanned");
            ScanOutcome::Unknown
        }
        Err(e) => {
            warn!(code = %code, error = %e, "Scan could not be recorded");
            ScanOutcome::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Presence, Role};
    use crate::roster::Roster;
    use crate::store::MemoryBackend;

    fn store() -> RosterStore {
        RosterStore::with_roster(Roster::seed(), MemoryBackend::new())
    }

    #[test]
    fn test_scan_success_then_already_present() {
        let store = store();

        let first = process_scan(&store, "1001");
        assert!(first.is_success());
        assert_eq!(first.person().unwrap().presence, Presence::Present);

        let second = process_scan(&store, "1001");
        assert!(matches!(second, ScanOutcome::AlreadyPresent(ref p) if p.code == "1001"));
        assert_eq!(second.severity(), Severity::Warning);
        assert_eq!(store.find("1001").unwrap().absence_count, 0);
    }

    #[test]
    fn test_scan_trims_whitespace() {
        let store = store();
        assert!(process_scan(&store, "  2001\n").is_success());
        assert!(store.find("2001").unwrap().is_present());
    }

    #[test]
    fn test_scan_unknown_code() {
        let store = store();
        let before = store.people();
        let outcome = process_scan(&store, "0000");
        assert_eq!(outcome, ScanOutcome::Unknown);
        assert!(outcome.person().is_none());
        assert_eq!(outcome.severity(), Severity::Error);
        assert_eq!(store.people(), before);
    }

    #[test]
    fn test_scan_blank_is_unknown() {
        assert_eq!(process_scan(&store(), "   "), ScanOutcome::Unknown);
    }

    #[test]
    fn test_messages_by_role() {
        let staff = Person::new("2001", "Mr. Ali", Role::Staff);
        let student = Person::new("1001", "Amira", Role::Student);
        assert_eq!(ScanOutcome::Success(staff).message(), "Welcome, Mr. Ali!");
        assert_eq!(
            ScanOutcome::Success(student.clone()).message(),
            "Attendance recorded: Amira"
        );
        assert_eq!(
            ScanOutcome::AlreadyPresent(student).to_string(),
            "Amira is already checked in today"
        );
        assert_eq!(ScanOutcome::Unknown.message(), "Not enrolled in the system");
    }
}
