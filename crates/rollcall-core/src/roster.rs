//! The in-memory roster and every rule that governs it.
//!
//! `Roster` is a plain value: it owns the people, enforces unique codes,
//! and implements scan marking and the day rollover. Locking and
//! persistence live one layer up in [`crate::store::RosterStore`].

use std::collections::HashSet;

use tracing::debug;

use crate::error::{AttendanceError, Result};
use crate::models::{Person, Presence, Role, RosterFilter, Stats};

/// Result of marking a known code present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkResult {
    /// The person was absent and is now present.
    Marked(Person),
    /// The person had already been marked today; nothing changed.
    AlreadyPresent(Person),
}

/// Counts reported by a rollover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RolloverSummary {
    /// People whose absence count went up by one.
    pub absences_recorded: usize,
    /// People who were present and have been reset to absent.
    pub presence_cleared: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    people: Vec<Person>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from already-decoded records. Codes and names are
    /// trimmed the same way `add_person` trims them, then blank fields and
    /// duplicate codes are rejected.
    pub fn from_people(mut people: Vec<Person>) -> Result<Self> {
        for person in &mut people {
            trim_in_place(&mut person.code);
            trim_in_place(&mut person.name);
        }
        validate_people(&people)?;
        Ok(Self { people })
    }

    /// The default roster written on first run.
    pub fn seed() -> Self {
        let people = vec![
            Person::new("1001", "Mohamed Islam", Role::Student),
            Person::new("1002", "Ahmed Khaled", Role::Student),
            Person::new("1003", "Youssef Ali", Role::Student),
            Person::new("2001", "Mr. Ali", Role::Staff),
            Person::new("2002", "Mr. Mohamed", Role::Staff),
        ];
        Self { people }
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Look up by code. Surrounding whitespace in `code` is ignored.
    pub fn find(&self, code: &str) -> Option<&Person> {
        let code = code.trim();
        self.people.iter().find(|p| p.code == code)
    }

    fn position(&self, code: &str) -> Option<usize> {
        let code = code.trim();
        self.people.iter().position(|p| p.code == code)
    }

    /// Enroll a new person. Code and name are stored trimmed.
    pub fn add_person(&mut self, code: &str, name: &str, role: Role) -> Result<Person> {
        let code = non_empty(code, "code")?;
        let name = non_empty(name, "name")?;
        if self.find(code).is_some() {
            return Err(AttendanceError::DuplicateCode(code.to_string()));
        }

        let person = Person::new(code, name, role);
        self.people.push(person.clone());
        debug!(code = %code, role = %role, "Added person");
        Ok(person)
    }

    /// Change the name and/or role of an existing person. The code cannot
    /// be changed; delete and re-add instead.
    pub fn update_person(
        &mut self,
        code: &str,
        name: Option<&str>,
        role: Option<Role>,
    ) -> Result<Person> {
        let name = name.map(|n| non_empty(n, "name")).transpose()?;
        let idx = self
            .position(code)
            .ok_or_else(|| AttendanceError::NotFound(code.trim().to_string()))?;

        let person = &mut self.people[idx];
        if let Some(name) = name {
            person.name = name.to_string();
        }
        if let Some(role) = role {
            person.role = role;
        }
        Ok(person.clone())
    }

    /// Remove a person by code. Deleting an unknown code is not an error;
    /// the removed entry is returned when there was one.
    pub fn delete_person(&mut self, code: &str) -> Option<Person> {
        let idx = self.position(code)?;
        Some(self.people.remove(idx))
    }

    pub fn record_present(&mut self, code: &str) -> Result<MarkResult> {
        let idx = self
            .position(code)
            .ok_or_else(|| AttendanceError::NotFound(code.trim().to_string()))?;

        let person = &mut self.people[idx];
        if person.is_present() {
            return Ok(MarkResult::AlreadyPresent(person.clone()));
        }
        person.presence = Presence::Present;
        Ok(MarkResult::Marked(person.clone()))
    }

    /// Close out the day: everyone still absent gets one more absence,
    /// then everyone is reset to absent. Present people are not counted.
    pub fn rollover(&mut self) -> RolloverSummary {
        let mut summary = RolloverSummary::default();
        for person in &mut self.people {
            match person.presence {
                Presence::Absent => {
                    person.absence_count = person.absence_count.saturating_add(1);
                    summary.absences_recorded += 1;
                }
                Presence::Present => summary.presence_cleared += 1,
            }
            person.presence = Presence::Absent;
        }
        summary
    }

    /// Zero every absence count. Presence is left alone.
    pub fn reset_absences(&mut self) {
        for person in &mut self.people {
            person.absence_count = 0;
        }
    }

    pub fn stats(&self, role: Role) -> Stats {
        Stats::from_people(&self.people, role)
    }

    pub fn filter(&self, filter: &RosterFilter) -> Vec<Person> {
        self.people
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect()
    }
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

fn non_empty<'a>(value: &'a str, field: &'static str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AttendanceError::EmptyField(field))
    } else {
        Ok(trimmed)
    }
}

/// Check a decoded record set before it is allowed to become a roster.
pub(crate) fn validate_people(people: &[Person]) -> Result<()> {
    let mut seen = HashSet::with_capacity(people.len());
    for (idx, person) in people.iter().enumerate() {
        if person.code.trim().is_empty() {
            return Err(AttendanceError::MalformedInput(format!(
                "record {} has an empty code",
                idx
            )));
        }
        if person.name.trim().is_empty() {
            return Err(AttendanceError::MalformedInput(format!(
                "record {} ({}) has an empty name",
                idx, person.code
            )));
        }
        if !seen.insert(person.code.as_str()) {
            return Err(AttendanceError::MalformedInput(format!(
                "duplicate code {}",
                person.code
            )));
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
