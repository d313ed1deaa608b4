//! Plain-text rendering for the terminal.

use std::fmt::Write;

use rollcall_core::{Person, Role, ScanOutcome, Severity, Stats};

/// Widest name shown in tables before truncation
const NAME_WIDTH: usize = 28;

pub fn outcome_line(outcome: &ScanOutcome) -> String {
    let tag = match outcome.severity() {
        Severity::Success => "OK",
        Severity::Warning => "!!",
        Severity::Error => "XX",
    };
    format!("[{}] {}", tag, outcome.message())
}

pub fn people_table(people: &[Person]) -> String {
    if people.is_empty() {
        return "No matching people\n".to_string();
    }

    let code_width = people
        .iter()
        .map(|p| p.code.chars().count())
        .max()
        .unwrap_or(0)
        .max("CODE".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<cw$}  {:<nw$}  {:<7}  {:<7}  {}",
        "CODE",
        "NAME",
        "ROLE",
        "STATUS",
        "ABSENCES",
        cw = code_width,
        nw = NAME_WIDTH
    );
    for p in people {
        let _ = writeln!(
            out,
            "{:<cw$}  {:<nw$}  {:<7}  {:<7}  {}",
            p.code,
            truncate(&p.name, NAME_WIDTH),
            p.role.to_string(),
            p.presence.to_string(),
            p.absence_count,
            cw = code_width,
            nw = NAME_WIDTH
        );
    }
    out
}

pub fn stats_table(stats: &[(Role, Stats)]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<8}  {:>5}  {:>7}  {:>6}", "ROLE", "TOTAL", "PRESENT", "ABSENT");
    for (role, s) in stats {
        let _ = writeln!(
            out,
            "{:<8}  {:>5}  {:>7}  {:>6}",
            role.to_string(),
            s.total,
            s.present,
            s.absent
        );
    }
    out
}

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
        assert_eq!(truncate("محمد إسلام", 6), "محم...");
    }

    #[test]
    fn test_outcome_line() {
        let p = Person::new("2001", "Mr. Ali", Role::Staff);
        assert_eq!(outcome_line(&ScanOutcome::Success(p.clone())), "[OK] Welcome, Mr. Ali!");
        assert_eq!(
            outcome_line(&ScanOutcome::AlreadyPresent(p)),
            "[!!] Mr. Ali is already checked in today"
        );
        assert_eq!(outcome_line(&ScanOutcome::Unknown), "[XX] Not enrolled in the system");
    }

    #[test]
    fn test_people_table() {
        let table = people_table(&[Person::new("1001", "Amira", Role::Student)]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("CODE"));
        assert!(lines[1].starts_with("1001"));
        assert!(lines[1].contains("Student"));
        assert!(lines[1].trim_end().ends_with('0'));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(people_table(&[]), "No matching people\n");
    }

    #[test]
    fn test_stats_table() {
        let table = stats_table(&[(Role::Student, Stats { total: 3, present: 2, absent: 1 })]);
        assert!(table.lines().nth(1).unwrap().starts_with("Student"));
    }
}
