use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{Person, Role, RosterFilter, Stats};
use crate::roster::{MarkResult, Roster, RolloverSummary};
use crate::snapshot;
use crate::store::SnapshotBackend;

/// Owns the live roster.
///
/// Mutations take the write lock for their whole duration, so two racing
/// scans of the same code yield exactly one `Marked`. Reads share the read
/// lock and always see a whole roster, never a half-applied change.
pub struct RosterStore {
    roster: RwLock<Roster>,
    backend: Box<dyn SnapshotBackend>,
}

impl RosterStore {
    /// Load the persisted roster, seeding and saving the default roster
    /// when no snapshot exists yet.
    pub fn open(backend: impl SnapshotBackend + 'static) -> Result<Self> {
        let roster = match backend.read()? {
            Some(data) => {
                let roster = snapshot::decode(&data)?;
                debug!(location = %backend.describe(), count = roster.len(), "Loaded roster");
                roster
            }
            None => {
                let seed = Roster::seed();
                backend.write(&snapshot::encode(seed.people())?)?;
                info!(location = %backend.describe(), count = seed.len(), "Seeded default roster");
                seed
            }
        };

        Ok(Self {
            roster: RwLock::new(roster),
            backend: Box::new(backend),
        })
    }

    /// Wrap a roster without touching the backend. Nothing is persisted
    /// until `save()` is called.
    pub fn with_roster(roster: Roster, backend: impl SnapshotBackend + 'static) -> Self {
        Self {
            roster: RwLock::new(roster),
            backend: Box::new(backend),
        }
    }

    // A panic can't leave a roster half-mutated (every mutation validates
    // first), so a poisoned lock still guards a consistent value.
    fn read(&self) -> RwLockReadGuard<'_, Roster> {
        self.roster.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Roster> {
        self.roster.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn location(&self) -> String {
        self.backend.describe()
    }

    // ===== Reads =====

    pub fn people(&self) -> Vec<Person> {
        self.read().people().to_vec()
    }

    pub fn find(&self, code: &str) -> Option<Person> {
        self.read().find(code).cloned()
    }

    pub fn filter(&self, filter: &RosterFilter) -> Vec<Person> {
        self.read().filter(filter)
    }

    pub fn stats(&self, role: Role) -> Stats {
        self.read().stats(role)
    }

    /// Stats for every role taken from the same view of the roster.
    pub fn all_stats(&self) -> Vec<(Role, Stats)> {
        let roster = self.read();
        Role::ALL.iter().map(|&role| (role, roster.stats(role))).collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // ===== Mutations =====

    pub fn add_person(&self, code: &str, name: &str, role: Role) -> Result<Person> {
        let person = self.write().add_person(code, name, role)?;
        info!(code = %person.code, role = %role, "Enrolled person");
        Ok(person)
    }

    pub fn update_person(&self, code: &str, name: Option<&str>, role: Option<Role>) -> Result<Person> {
        let person = self.write().update_person(code, name, role)?;
        info!(code = %code, "Updated person");
        Ok(person)
    }

    pub fn delete_person(&self, code: &str) -> Option<Person> {
        let removed = self.write().delete_person(code);
        match &removed {
            Some(_) => info!(code = %code, "Deleted person"),
            None => debug!(code = %code, "Delete of unknown code ignored"),
        }
        removed
    }

    pub fn record_present(&self, code: &str) -> Result<MarkResult> {
        self.write().record_present(code)
    }

    pub fn rollover(&self) -> RolloverSummary {
        let summary = self.write().rollover();
        info!(
            absences_recorded = summary.absences_recorded,
            presence_cleared = summary.presence_cleared,
            "Started a new day"
        );
        summary
    }

    pub fn reset_absences(&self) {
        self.write().reset_absences();
        info!("Reset all absence counts");
    }

    // ===== Snapshots =====

    pub fn export_snapshot(&self) -> Result<String> {
        snapshot::encode(self.read().people())
    }

    /// Replace the whole roster with a decoded snapshot. Decoding happens
    /// before the lock is taken; on any error the roster is untouched.
    pub fn import_snapshot(&self, data: &str) -> Result<usize> {
        let imported = snapshot::decode(data)?;
        let count = imported.len();
        *self.write() = imported;
        info!(count, "Imported roster snapshot");
        Ok(count)
    }

    /// Persist the current roster. The read lock is held across the write
    /// so the stored snapshot is exactly the state being read.
    pub fn save(&self) -> Result<()> {
        let roster = self.read();
        let contents = snapshot::encode(roster.people())?;
        self.backend.write(&contents)?;
        debug!(location = %self.backend.describe(), count = roster.len(), "Saved roster");
        Ok(())
    }

    /// Re-read the persisted roster. If the snapshot is missing or can't
    /// be decoded the in-memory roster is kept. Returns whether the
    /// roster was replaced.
    pub fn reload(&self) -> Result<bool> {
        let data = match self.backend.read() {
            Ok(Some(data)) => data,
            Ok(None) => {
                warn!(location = %self.backend.describe(), "No snapshot to reload, keeping current roster");
                return Ok(false);
            }
            Err(e) => {
                warn!(error = %e, "Reload failed, keeping current roster");
                return Err(e);
            }
        };

        match snapshot::decode(&data) {
            Ok(roster) => {
                let count = roster.len();
                *self.write() = roster;
                info!(count, "Reloaded roster");
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "Stored snapshot is invalid, keeping current roster");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::AttendanceError;
    use crate::models::Presence;
    use crate::store::MemoryBackend;

    fn open_memory() -> (Arc<MemoryBackend>, RosterStore) {
        let backend = Arc::new(MemoryBackend::new());
        let store = RosterStore::open(Arc::clone(&backend)).unwrap();
        (backend, store)
    }

    #[test]
    fn test_open_seeds_and_persists() {
        let (backend, store) = open_memory();
        assert_eq!(store.len(), 5);
        let stored = backend.contents().expect("seed should be persisted");
        assert_eq!(snapshot::decode(&stored).unwrap().len(), 5);
    }

    #[test]
    fn test_open_existing_snapshot() {
        let backend = MemoryBackend::with_contents(
            r#"[{"code":"42","name":"Zaid","role":"Staff","presence":"Present","absenceCount":7}]"#,
        );
        let store = RosterStore::open(backend).unwrap();
        let p = store.find("42").unwrap();
        assert_eq!(p.presence, Presence::Present);
        assert_eq!(p.absence_count, 7);
    }

    #[test]
    fn test_open_invalid_snapshot_fails() {
        let backend = MemoryBackend::with_contents("{}");
        assert!(matches!(
            RosterStore::open(backend),
            Err(AttendanceError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_mutations_do_not_persist_until_save() {
        let (backend, store) = open_memory();
        let before = backend.contents();

        store.add_person("3001", "New Person", Role::Student).unwrap();
        store.record_present("1001").unwrap();
        assert_eq!(backend.contents(), before);

        store.save().unwrap();
        let saved = snapshot::decode(&backend.contents().unwrap()).unwrap();
        assert!(saved.find("3001").is_some());
        assert!(saved.find("1001").unwrap().is_present());
    }

    #[test]
    fn test_save_failure_surfaces() {
        let (backend, store) = open_memory();
        backend.fail_writes(true);
        assert!(matches!(store.save(), Err(AttendanceError::Persistence { .. })));
    }

    #[test]
    fn test_import_replaces_whole_roster() {
        let (_, store) = open_memory();
        let count = store
            .import_snapshot(r#"[{"code":"9","name":"Nine","role":"Student","presence":"Absent","absenceCount":1}]"#)
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(store.len(), 1);
        assert!(store.find("1001").is_none());
    }

    #[test]
    fn test_failed_import_leaves_roster_unchanged() {
        let (_, store) = open_memory();
        store.record_present("1001").unwrap();
        let before = store.people();

        let err = store
            .import_snapshot(r#"[{"code":"9","name":"Nine","presence":"Absent","absenceCount":1}]"#)
            .unwrap_err();
        assert!(matches!(err, AttendanceError::MalformedInput(_)));
        assert_eq!(store.people(), before);
    }

    #[test]
    fn test_reload_failure_keeps_current() {
        let (backend, store) = open_memory();
        store.record_present("1001").unwrap();

        backend.set_contents(Some("garbage".to_string()));
        assert!(store.reload().is_err());
        assert!(store.find("1001").unwrap().is_present());

        backend.fail_reads(true);
        assert!(store.reload().is_err());
        assert_eq!(store.len(), 5);

        backend.fail_reads(false);
        backend.set_contents(None);
        assert!(!store.reload().unwrap());
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_reload_discards_unsaved_changes() {
        let (_, store) = open_memory();
        store.record_present("1001").unwrap();
        assert!(store.reload().unwrap());
        assert!(!store.find("1001").unwrap().is_present());
    }

    #[test]
    fn test_all_stats() {
        let (_, store) = open_memory();
        store.record_present("2001").unwrap();
        let stats = store.all_stats();
        assert_eq!(stats[0], (Role::Student, Stats { total: 3, present: 0, absent: 3 }));
        assert_eq!(stats[1], (Role::Staff, Stats { total: 2, present: 1, absent: 1 }));
    }

    #[test]
    fn test_delete_unknown_returns_none() {
        let (_, store) = open_memory();
        assert!(store.delete_person("nope").is_none());
        assert_eq!(store.len(), 5);
    }
}
