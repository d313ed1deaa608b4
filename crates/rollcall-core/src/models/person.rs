use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Student,
    // Browser-era snapshots called staff members "Teacher"
    #[serde(alias = "Teacher")]
    Staff,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Student, Role::Staff];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "Student"),
            Role::Staff => write!(f, "Staff"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "staff" | "teacher" => Ok(Role::Staff),
            other => Err(format!("unknown role '{}' (expected student or staff)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Presence {
    Present,
    Absent,
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Presence::Present => write!(f, "Present"),
            Presence::Absent => write!(f, "Absent"),
        }
    }
}

impl FromStr for Presence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "present" => Ok(Presence::Present),
            "absent" => Ok(Presence::Absent),
            other => Err(format!("unknown status '{}' (expected present or absent)", other)),
        }
    }
}

/// A single roster entry.
///
/// The serialized shape is the snapshot record format: exactly
/// `code`, `name`, `role`, `presence` and `absenceCount`, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Person {
    #[serde(alias = "barcode")]
    pub code: String,
    pub name: String,
    pub role: Role,
    #[serde(alias = "status")]
    pub presence: Presence,
    #[serde(alias = "totalAbsences")]
    pub absence_count: u32,
}

impl Person {
    /// A freshly enrolled person: absent, with no recorded absences.
    pub fn new(code: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            role,
            presence: Presence::Absent,
            absence_count: 0,
        }
    }

    pub fn is_present(&self) -> bool {
        self.presence == Presence::Present
    }

    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }
}

/// Head count for one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stats {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
}

impl Stats {
    pub fn from_people<'a>(people: impl IntoIterator<Item = &'a Person>, role: Role) -> Self {
        let (total, present) = people
            .into_iter()
            .filter(|p| p.role == role)
            .fold((0, 0), |(total, present), p| {
                (total + 1, present + usize::from(p.is_present()))
            });
        Stats {
            total,
            present,
            absent: total - present,
        }
    }
}

/// Listing criteria. `None` means "all" for presence and role; an empty
/// search matches everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterFilter {
    pub presence: Option<Presence>,
    pub role: Option<Role>,
    pub search: String,
}

impl RosterFilter {
    pub fn matches(&self, person: &Person) -> bool {
        let matches_presence = self.presence.map_or(true, |p| person.presence == p);
        let matches_role = self.role.map_or(true, |r| person.role == r);
        let query = self.search.trim();
        let matches_search = query.is_empty()
            || person.name.to_lowercase().contains(&query.to_lowercase())
            || person.code.contains(query);

        matches_presence && matches_role && matches_search
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Person> {
        let mut present = Person::new("1001", "Amira Hassan", Role::Student);
        present.presence = Presence::Present;
        vec![
            present,
            Person::new("1002", "Omar Said", Role::Student),
            Person::new("2001", "Layla Mansour", Role::Staff),
        ]
    }

    #[test]
    fn test_new_person_is_absent() {
        let p = Person::new("1001", "Amira", Role::Student);
        assert_eq!(p.presence, Presence::Absent);
        assert_eq!(p.absence_count, 0);
        assert!(!p.is_present());
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("student".parse::<Role>(), Ok(Role::Student));
        assert_eq!("STAFF".parse::<Role>(), Ok(Role::Staff));
        assert_eq!(" Teacher ".parse::<Role>(), Ok(Role::Staff));
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn test_stats_by_role() {
        let people = sample();
        let students = Stats::from_people(&people, Role::Student);
        assert_eq!(students, Stats { total: 2, present: 1, absent: 1 });

        let staff = Stats::from_people(&people, Role::Staff);
        assert_eq!(staff, Stats { total: 1, present: 0, absent: 1 });
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(Stats::from_people(&Vec::<Person>::new(), Role::Staff), Stats::default());
    }

    #[test]
    fn test_filter_by_presence_and_role() {
        let people = sample();
        let filter = RosterFilter {
            presence: Some(Presence::Absent),
            role: Some(Role::Student),
            ..Default::default()
        };
        let codes: Vec<&str> = people
            .iter()
            .filter(|p| filter.matches(p))
            .map(|p| p.code.as_str())
            .collect();
        assert_eq!(codes, vec!["1002"]);
    }

    #[test]
    fn test_filter_search_name_case_insensitive() {
        let people = sample();
        let filter = RosterFilter {
            search: "LAYLA".to_string(),
            ..Default::default()
        };
        assert_eq!(people.iter().filter(|p| filter.matches(p)).count(), 1);
    }

    #[test]
    fn test_filter_search_code_substring() {
        let people = sample();
        let filter = RosterFilter {
            search: "100".to_string(),
            ..Default::default()
        };
        assert_eq!(people.iter().filter(|p| filter.matches(p)).count(), 2);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(Person::new("1001", "Amira", Role::Staff)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "code": "1001",
                "name": "Amira",
                "role": "Staff",
                "presence": "Absent",
                "absenceCount": 0
            })
        );
    }

    #[test]
    fn test_legacy_field_names_accepted() {
        let json = r#"{"barcode":"2001","name":"Layla","role":"Teacher","status":"Present","totalAbsences":3}"#;
        let p: Person = serde_json::from_str(json).unwrap();
        assert_eq!(p.code, "2001");
        assert_eq!(p.role, Role::Staff);
        assert_eq!(p.presence, Presence::Present);
        assert_eq!(p.absence_count, 3);
    }
}
