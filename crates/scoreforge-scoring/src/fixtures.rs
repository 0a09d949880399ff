//! Constraints over the shared test fixtures, mirroring the brute-force
//! scorers of `scoreforge-test`.

use scoreforge_core::{HardSoftScore, SimpleScore};
use scoreforge_test::{Employee, Lesson, Queen, Shift};

use crate::stream::collector;
use crate::stream::joiner::{equal, equal_bi, filtering, overlapping};
use crate::{Constraint, ConstraintFactory};

pub(crate) fn queen_constraints(factory: &ConstraintFactory) -> Vec<Constraint<SimpleScore>> {
    vec![
        factory
            .for_each_unique_pair(equal(|q: &Queen| q.row))
            .filter(|a: &Queen, _: &Queen| a.row.is_some())
            .penalize(SimpleScore::of(1))
            .as_constraint("Row conflict"),
        factory
            .for_each_unique_pair(equal(Queen::ascending_diagonal))
            .filter(|a: &Queen, _: &Queen| a.row.is_some())
            .penalize(SimpleScore::of(1))
            .as_constraint("Ascending diagonal conflict"),
        factory
            .for_each_unique_pair(equal(Queen::descending_diagonal))
            .filter(|a: &Queen, _: &Queen| a.row.is_some())
            .penalize(SimpleScore::of(1))
            .as_constraint("Descending diagonal conflict"),
    ]
}

pub(crate) fn shift_constraints(factory: &ConstraintFactory) -> Vec<Constraint<HardSoftScore>> {
    let assigned = factory
        .for_each::<Shift>()
        .filter(|s: &Shift| s.employee.is_some());
    vec![
        factory
            .for_each_unique_pair(equal(|s: &Shift| s.employee).and(overlapping(
                |s: &Shift| s.start,
                |s: &Shift| s.end,
                |s: &Shift| s.start,
                |s: &Shift| s.end,
            )))
            .filter(|a: &Shift, _: &Shift| a.employee.is_some())
            .penalize_weighted(HardSoftScore::of_hard(1), |a: &Shift, b: &Shift| {
                a.overlap_minutes(b)
            })
            .as_constraint_in("shifts", "Overlapping shifts"),
        assigned
            .clone()
            .join::<Employee>(equal_bi(|s: &Shift| s.employee, |e: &Employee| Some(e.id)))
            .filter(|s: &Shift, e: &Employee| !e.has_skill(&s.required_skill))
            .penalize(HardSoftScore::of_hard(1))
            .as_constraint_in("shifts", "Missing skill"),
        factory
            .for_each::<Shift>()
            .filter(|s: &Shift| s.employee.is_none())
            .penalize(HardSoftScore::of_soft(1))
            .as_constraint_in("shifts", "Unassigned shift"),
        factory
            .for_each::<Employee>()
            .if_not_exists::<Shift>(equal_bi(|e: &Employee| Some(e.id), |s: &Shift| s.employee))
            .penalize(HardSoftScore::of_soft(1))
            .as_constraint_in("shifts", "Idle employee"),
        assigned
            .group_by(|s: &Shift| s.employee, collector::count())
            .penalize_weighted(HardSoftScore::of_soft(1), |_: &Option<i64>, n: &usize| {
                (*n * *n) as i64
            })
            .as_constraint_in("shifts", "Workload"),
    ]
}

pub(crate) fn lesson_constraints(factory: &ConstraintFactory) -> Vec<Constraint<SimpleScore>> {
    vec![
        factory
            .for_each_unique_pair(equal(|l: &Lesson| l.room).and(overlapping(
                |l: &Lesson| l.start,
                |l: &Lesson| l.end,
                |l: &Lesson| l.start,
                |l: &Lesson| l.end,
            )))
            .penalize(SimpleScore::of(1))
            .as_constraint("Room conflict"),
        factory
            .for_each::<Lesson>()
            .if_not_exists::<Lesson>(
                equal(|l: &Lesson| l.room).and(filtering(|a: &Lesson, b: &Lesson| a.id != b.id)),
            )
            .reward(SimpleScore::of(1))
            .as_constraint("Lonely lesson"),
    ]
}
