//! Employee shift scheduling fixtures.
//!
//! Shifts are half-open minute intervals `[start, end)` optionally assigned
//! to an employee by id. The reference scorer covers four constraints:
//!
//! | Constraint | Level | Per match |
//! |---|---|---|
//! | Overlapping shifts | hard | overlap in minutes |
//! | Missing skill | hard | 1 |
//! | Unassigned shift | soft | 1 |
//! | Idle employee | soft | 1 |
//!
//! plus a soft `Workload` penalty of `count²` per employee with shifts.

use std::collections::BTreeMap;

use scoreforge_core::HardSoftScore;

use crate::unique_pairs;

#[derive(Clone, Debug, PartialEq)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub skills: Vec<String>,
}

impl Employee {
    pub fn new(id: i64, name: &str, skills: &[&str]) -> Self {
        Self {
            id,
            name: name.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Shift {
    pub id: i64,
    pub start: i64,
    pub end: i64,
    pub required_skill: String,
    pub employee: Option<i64>,
}

impl Shift {
    pub fn new(id: i64, start: i64, end: i64, required_skill: &str) -> Self {
        Self {
            id,
            start,
            end,
            required_skill: required_skill.to_string(),
            employee: None,
        }
    }

    /// Returns the shift assigned to `employee`.
    pub fn assigned_to(mut self, employee: i64) -> Self {
        self.employee = Some(employee);
        self
    }

    /// Minutes both shifts cover, zero if they are disjoint.
    pub fn overlap_minutes(&self, other: &Shift) -> i64 {
        (self.end.min(other.end) - self.start.max(other.start)).max(0)
    }
}

/// Total overlap of every pair of shifts held by the same employee.
pub fn overlap_penalty(shifts: &[Shift]) -> i64 {
    unique_pairs(shifts)
        .filter(|(a, b)| a.employee.is_some() && a.employee == b.employee)
        .map(|(a, b)| a.overlap_minutes(b))
        .sum()
}

/// Assigned shifts whose employee lacks the required skill.
pub fn missing_skill_count(shifts: &[Shift], employees: &[Employee]) -> i64 {
    shifts
        .iter()
        .filter(|shift| {
            shift.employee.is_some_and(|id| {
                employees
                    .iter()
                    .any(|e| e.id == id && !e.has_skill(&shift.required_skill))
            })
        })
        .count() as i64
}

pub fn unassigned_count(shifts: &[Shift]) -> i64 {
    shifts.iter().filter(|s| s.employee.is_none()).count() as i64
}

/// Employees holding no shift.
pub fn idle_count(shifts: &[Shift], employees: &[Employee]) -> i64 {
    employees
        .iter()
        .filter(|e| !shifts.iter().any(|s| s.employee == Some(e.id)))
        .count() as i64
}

/// Shift count per assigned employee id.
pub fn shifts_per_employee(shifts: &[Shift]) -> BTreeMap<i64, i64> {
    let mut counts = BTreeMap::new();
    for id in shifts.iter().filter_map(|s| s.employee) {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
}

/// Sum of squared shift counts.
pub fn workload_penalty(shifts: &[Shift]) -> i64 {
    shifts_per_employee(shifts).values().map(|n| n * n).sum()
}

pub fn score(shifts: &[Shift], employees: &[Employee]) -> HardSoftScore {
    HardSoftScore::of(
        -overlap_penalty(shifts) - missing_skill_count(shifts, employees),
        -unassigned_count(shifts) - idle_count(shifts, employees) - workload_penalty(shifts),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff() -> Vec<Employee> {
        vec![
            Employee::new(1, "Ann", &["nurse"]),
            Employee::new(2, "Beth", &["doctor", "nurse"]),
            Employee::new(3, "Carl", &[]),
        ]
    }

    #[test]
    fn test_overlap_minutes() {
        let a = Shift::new(1, 0, 480, "nurse");
        let b = Shift::new(2, 420, 900, "nurse");
        let c = Shift::new(3, 480, 960, "nurse");
        assert_eq!(a.overlap_minutes(&b), 60);
        assert_eq!(a.overlap_minutes(&c), 0);
    }

    #[test]
    fn test_reference_score() {
        let shifts = vec![
            Shift::new(1, 0, 480, "nurse").assigned_to(1),
            Shift::new(2, 420, 900, "doctor").assigned_to(1),
            Shift::new(3, 0, 480, "nurse"),
        ];
        let employees = staff();
        assert_eq!(overlap_penalty(&shifts), 60);
        assert_eq!(missing_skill_count(&shifts, &employees), 1);
        assert_eq!(unassigned_count(&shifts), 1);
        assert_eq!(idle_count(&shifts, &employees), 2);
        assert_eq!(workload_penalty(&shifts), 4);
        assert_eq!(score(&shifts, &employees), HardSoftScore::of(-61, -7));
    }
}
