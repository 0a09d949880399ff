//! Stream API tests: every operator evaluated through a compiled network
//! and checked against a direct computation.

use scoreforge_core::{HardSoftScore, ImpactType, Score, SimpleScore};
use scoreforge_test::{lesson, nqueens, shift, Employee, Lesson, Queen, Shift};

use super::*;
use crate::fact::Facts;
use crate::fixtures::{lesson_constraints, queen_constraints, shift_constraints};
use crate::network::NetworkTemplate;
use crate::stream::joiner::{bi, equal, equal_bi, greater_than, less_than, tri};

fn evaluate<Sc: Score>(constraints: Vec<Constraint<Sc>>, facts: &Facts) -> Sc {
    let template = NetworkTemplate::build(constraints).unwrap();
    let mut session = template.instantiate(false);
    for (id, type_id) in facts.iter() {
        session.insert(id, type_id).unwrap();
    }
    session.flush(facts).unwrap();
    session.check_invariants().unwrap();
    session.score()
}

fn store<T: crate::fact::Fact>(facts: &mut Facts, items: &[T]) {
    for item in items {
        facts.insert(item.clone());
    }
}

fn staff() -> Vec<Employee> {
    vec![
        Employee::new(1, "Ann", &["nurse"]),
        Employee::new(2, "Beth", &["doctor", "nurse"]),
        Employee::new(3, "Carl", &[]),
    ]
}

fn roster() -> Vec<Shift> {
    vec![
        Shift::new(1, 0, 480, "nurse").assigned_to(1),
        Shift::new(2, 420, 900, "doctor").assigned_to(1),
        Shift::new(3, 0, 480, "nurse"),
        Shift::new(4, 480, 960, "nurse").assigned_to(2),
        Shift::new(5, 900, 1000, "doctor").assigned_to(2),
        Shift::new(6, 100, 200, "nurse").assigned_to(1),
    ]
}

fn lessons() -> Vec<Lesson> {
    vec![
        Lesson::new(1, 1, 0, 60),
        Lesson::new(2, 1, 30, 90),
        Lesson::new(3, 1, 60, 120),
        Lesson::new(4, 2, 0, 60),
        Lesson::new(5, 3, 10, 20),
        Lesson::new(6, 3, 10, 20),
    ]
}

// ============================================================================
// Constraint metadata
// ============================================================================

#[test]
fn test_constraint_metadata() {
    let factory = ConstraintFactory::new();
    let hard = factory
        .for_each::<Shift>()
        .penalize(HardSoftScore::of_hard(2))
        .as_constraint_in("shifts", "Hard one");
    assert_eq!(hard.name(), "Hard one");
    assert_eq!(hard.constraint_ref().full_name(), "shifts/Hard one");
    assert_eq!(hard.impact_type(), ImpactType::Penalty);
    assert_eq!(hard.weight(), Some(HardSoftScore::of_hard(2)));
    assert!(hard.is_hard());

    let soft = factory
        .for_each::<Shift>()
        .reward(HardSoftScore::of_soft(1))
        .as_constraint("Soft one");
    assert_eq!(soft.constraint_ref().full_name(), "Soft one");
    assert_eq!(soft.impact_type(), ImpactType::Reward);
    assert!(!soft.is_hard());

    let dynamic = factory
        .for_each::<Shift>()
        .penalize_with(|s: &Shift| HardSoftScore::of_soft(s.end - s.start))
        .as_constraint("Dynamic");
    assert_eq!(dynamic.weight(), None);
    assert!(!dynamic.is_hard());
}

// ============================================================================
// Fixture constraint sets
// ============================================================================

#[test]
fn test_queens_match_brute_force() {
    for rows in [&[0, 1, 2, 3][..], &[1, 3, 0, 2], &[0, 0, 0, 0], &[3, 1, 1, 2, 0]] {
        let queens = nqueens::board(rows);
        let mut facts = Facts::new();
        store(&mut facts, &queens);
        let score = evaluate(queen_constraints(&ConstraintFactory::new()), &facts);
        assert_eq!(score, nqueens::score(&queens), "rows {:?}", rows);
    }
}

#[test]
fn test_unassigned_queens_are_ignored() {
    let mut facts = Facts::new();
    store(
        &mut facts,
        &[Queen::unassigned(0, 0), Queen::unassigned(1, 1), Queen::assigned(2, 2, 0)],
    );
    let score = evaluate(queen_constraints(&ConstraintFactory::new()), &facts);
    assert_eq!(score, SimpleScore::of(0));
}

#[test]
fn test_shift_constraints_match_brute_force() {
    let (shifts, employees) = (roster(), staff());
    let mut facts = Facts::new();
    store(&mut facts, &employees);
    store(&mut facts, &shifts);
    let score = evaluate(shift_constraints(&ConstraintFactory::new()), &facts);
    assert_eq!(score, shift::score(&shifts, &employees));
}

#[test]
fn test_lesson_constraints_match_brute_force() {
    let lessons = lessons();
    let mut facts = Facts::new();
    store(&mut facts, &lessons);
    let score = evaluate(lesson_constraints(&ConstraintFactory::new()), &facts);
    let expected = -lesson::room_conflicts(&lessons) + lesson::lonely_lessons(&lessons);
    assert_eq!(score, SimpleScore::of(expected));
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_map_then_group_by_key_counts_distinct_rooms() {
    let mut facts = Facts::new();
    store(&mut facts, &lessons());
    let constraint = ConstraintFactory::new()
        .for_each::<Lesson>()
        .map(|l: &Lesson| l.room)
        .group_by_key(|room: &u32| *room)
        .penalize(SimpleScore::of(1))
        .as_constraint("Rooms in use");
    assert_eq!(evaluate(vec![constraint], &facts), SimpleScore::of(-3));
}

#[test]
fn test_flatten_last_on_uni_and_bi_streams() {
    let mut facts = Facts::new();
    store(&mut facts, &staff());
    store(&mut facts, &roster());
    let factory = ConstraintFactory::new();

    let nurse_skills = factory
        .for_each::<Employee>()
        .flatten_last(|e: &Employee| e.skills.clone())
        .filter(|skill: &String| skill == "nurse")
        .penalize(SimpleScore::of(1))
        .as_constraint("Nurses");
    assert_eq!(evaluate(vec![nurse_skills], &facts), SimpleScore::of(-2));

    // skill matches per assigned shift: shifts 1, 4, 5 (doctor by Beth), 6
    let qualified = factory
        .for_each::<Shift>()
        .join::<Employee>(equal_bi(|s: &Shift| s.employee, |e: &Employee| Some(e.id)))
        .flatten_last(|e: &Employee| e.skills.clone())
        .filter(|s: &Shift, skill: &String| *skill == s.required_skill)
        .reward(SimpleScore::of(1))
        .as_constraint("Qualified");
    assert_eq!(evaluate(vec![qualified], &facts), SimpleScore::of(4));
}

#[test]
fn test_group_by_collectors() {
    let mut facts = Facts::new();
    store(&mut facts, &lessons());
    let factory = ConstraintFactory::new();

    let latest_end = factory
        .for_each::<Lesson>()
        .group_by(|l: &Lesson| l.room, collector::max(|l: &Lesson| l.end))
        .penalize_weighted(SimpleScore::of(1), |_: &u32, end: &Option<i64>| end.unwrap_or(0))
        .as_constraint("Latest end");
    assert_eq!(evaluate(vec![latest_end], &facts), SimpleScore::of(-(120 + 60 + 20)));

    let earliest_start = factory
        .for_each::<Lesson>()
        .group_by(|l: &Lesson| l.room, collector::min(|l: &Lesson| l.start))
        .reward_weighted(SimpleScore::of(1), |_: &u32, start: &Option<i64>| start.unwrap_or(0))
        .as_constraint("Earliest start");
    assert_eq!(evaluate(vec![earliest_start], &facts), SimpleScore::of(10));

    let distinct_starts = factory
        .for_each::<Lesson>()
        .group_by(|l: &Lesson| l.room, collector::count_distinct(|l: &Lesson| l.start))
        .penalize_weighted(SimpleScore::of(1), |_: &u32, n: &usize| *n as i64)
        .as_constraint("Distinct starts");
    assert_eq!(evaluate(vec![distinct_starts], &facts), SimpleScore::of(-(3 + 1 + 1)));

    let average = factory
        .for_each::<Lesson>()
        .group_by(|l: &Lesson| l.room, collector::average(|l: &Lesson| l.end - l.start))
        .penalize_with(|_: &u32, avg: &Option<f64>| {
            SimpleScore::of(avg.map_or(0, |a| a.round() as i64))
        })
        .as_constraint("Average length");
    assert_eq!(evaluate(vec![average], &facts), SimpleScore::of(-(60 + 60 + 10)));
}

#[test]
fn test_group_by_collect_over_whole_stream() {
    let factory = ConstraintFactory::new();
    let total = || {
        factory
            .for_each::<Lesson>()
            .group_by_collect(collector::sum(|l: &Lesson| l.end - l.start))
            .penalize_weighted(SimpleScore::of(1), |minutes: &i64| *minutes)
            .as_constraint("Total minutes")
    };

    let mut facts = Facts::new();
    store(&mut facts, &lessons());
    assert_eq!(evaluate(vec![total()], &facts), SimpleScore::of(-(60 * 4 + 10 + 10)));

    // no tuples, no group
    assert_eq!(evaluate(vec![total()], &Facts::new()), SimpleScore::of(0));
}

#[test]
fn test_to_list_collector() {
    let mut facts = Facts::new();
    store(&mut facts, &lessons());
    let constraint = ConstraintFactory::new()
        .for_each::<Lesson>()
        .group_by(|l: &Lesson| l.room, collector::to_list(|l: &Lesson| l.id))
        .filter(|_: &u32, ids: &Vec<i64>| ids.len() > 1)
        .penalize_weighted(SimpleScore::of(1), |_: &u32, ids: &Vec<i64>| ids.iter().sum())
        .as_constraint("Shared rooms");
    assert_eq!(evaluate(vec![constraint], &facts), SimpleScore::of(-(1 + 2 + 3 + 5 + 6)));
}

#[test]
fn test_tri_and_quad_joins() {
    let queens = nqueens::board(&[0, 0, 0, 0, 1]);
    let mut facts = Facts::new();
    store(&mut facts, &queens);
    let factory = ConstraintFactory::new();

    let triples = factory
        .for_each::<Queen>()
        .join::<Queen>(equal(|q: &Queen| q.row).and(less_than(|a: &Queen| a.id, |b: &Queen| b.id)))
        .join::<Queen>(
            bi::equal(|_: &Queen, b: &Queen| b.row, |c: &Queen| c.row)
                .and(bi::less_than(|_: &Queen, b: &Queen| b.id, |c: &Queen| c.id)),
        );
    let triple_count = triples
        .clone()
        .penalize(SimpleScore::of(1))
        .as_constraint("Triples");
    let quad_count = triples
        .join::<Queen>(tri::equal(|a: &Queen, _: &Queen, _: &Queen| a.row, |d: &Queen| d.row))
        .filter(|_: &Queen, _: &Queen, c: &Queen, d: &Queen| c.id < d.id)
        .penalize(SimpleScore::of(10))
        .as_constraint("Quads");

    // four queens on row 0: C(4,3) triples and one quad
    assert_eq!(
        evaluate(vec![triple_count, quad_count], &facts),
        SimpleScore::of(-4 - 10)
    );
}

#[test]
fn test_if_exists_against_derived_stream() {
    let mut facts = Facts::new();
    store(&mut facts, &staff());
    store(&mut facts, &roster());
    let factory = ConstraintFactory::new();

    let doctor_shifts = factory
        .for_each::<Shift>()
        .filter(|s: &Shift| s.required_skill == "doctor");
    let working_doctors = factory
        .for_each::<Employee>()
        .if_exists_stream(
            doctor_shifts.clone(),
            equal_bi(|e: &Employee| Some(e.id), |s: &Shift| s.employee),
        )
        .reward(SimpleScore::of(1))
        .as_constraint("Working on doctor shifts");
    let others = factory
        .for_each::<Employee>()
        .if_not_exists_stream(
            doctor_shifts,
            equal_bi(|e: &Employee| Some(e.id), |s: &Shift| s.employee),
        )
        .penalize(SimpleScore::of(10))
        .as_constraint("Never on doctor shifts");

    // Ann and Beth hold doctor shifts, Carl does not
    assert_eq!(evaluate(vec![working_doctors, others], &facts), SimpleScore::of(2 - 10));
}

#[test]
fn test_if_exists_on_bi_stream() {
    let mut facts = Facts::new();
    store(&mut facts, &staff());
    store(&mut facts, &roster());

    // assigned shift pairs of one employee where a later shift of that
    // employee also exists
    let constraint = ConstraintFactory::new()
        .for_each_unique_pair(equal(|s: &Shift| s.employee))
        .filter(|a: &Shift, _: &Shift| a.employee.is_some())
        .if_exists::<Shift>(
            bi::equal(|a: &Shift, _: &Shift| a.employee, |c: &Shift| c.employee).and(
                bi::greater_than(|a: &Shift, b: &Shift| a.start.max(b.start), |c: &Shift| c.start)
                    .and(bi::filtering(|_: &Shift, _: &Shift, _: &Shift| false)),
            ),
        )
        .penalize(SimpleScore::of(1))
        .as_constraint("Never");
    assert_eq!(evaluate(vec![constraint], &facts), SimpleScore::of(0));

    let constraint = ConstraintFactory::new()
        .for_each_unique_pair(equal(|s: &Shift| s.employee))
        .filter(|a: &Shift, _: &Shift| a.employee.is_some())
        .if_exists::<Shift>(bi::equal(|a: &Shift, _: &Shift| a.employee, |c: &Shift| c.employee).and(
            bi::less_than(|a: &Shift, b: &Shift| a.start.max(b.start), |c: &Shift| c.start),
        ))
        .penalize(SimpleScore::of(1))
        .as_constraint("Followed");
    // Ann: shifts 1, 2, 6 starting 0, 420, 100; pairs (1,6) max 100 < 420.
    // Beth: shifts 4, 5; no later shift.
    assert_eq!(evaluate(vec![constraint], &facts), SimpleScore::of(-1));
}

#[test]
fn test_join_keeps_identity_pairs() {
    let mut facts = Facts::new();
    store(&mut facts, &nqueens::board(&[0, 0, 1]));
    let constraint = ConstraintFactory::new()
        .for_each::<Queen>()
        .join::<Queen>(equal(|q: &Queen| q.row))
        .penalize(SimpleScore::of(1))
        .as_constraint("Ordered pairs");
    // (a,a) (b,b) (c,c) (a,b) (b,a)
    assert_eq!(evaluate(vec![constraint], &facts), SimpleScore::of(-5));

    let unique = ConstraintFactory::new()
        .for_each_unique_pair(equal(|q: &Queen| q.row))
        .penalize(SimpleScore::of(1))
        .as_constraint("Unique pairs");
    assert_eq!(evaluate(vec![unique], &facts), SimpleScore::of(-1));
}

#[test]
fn test_comparison_joiners() {
    let mut facts = Facts::new();
    store(&mut facts, &lessons());
    let constraint = ConstraintFactory::new()
        .for_each::<Lesson>()
        .join::<Lesson>(
            greater_than(|a: &Lesson| a.start, |b: &Lesson| b.start)
                .and(joiner::less_than_or_equal(|a: &Lesson| a.end, |b: &Lesson| b.end)),
        )
        .penalize(SimpleScore::of(1))
        .as_constraint("Starts later, ends no later");
    let lessons = lessons();
    let expected = lessons
        .iter()
        .flat_map(|a| lessons.iter().map(move |b| (a, b)))
        .filter(|(a, b)| a.start > b.start && a.end <= b.end)
        .count() as i64;
    assert_eq!(evaluate(vec![constraint], &facts), SimpleScore::of(-expected));
}

#[test]
fn test_dynamic_and_weighted_rewards() {
    let mut facts = Facts::new();
    store(&mut facts, &lessons());
    let factory = ConstraintFactory::new();
    let long = factory
        .for_each::<Lesson>()
        .reward_with(|l: &Lesson| SimpleScore::of(l.end - l.start))
        .as_constraint("Length");
    let rooms = factory
        .for_each::<Lesson>()
        .penalize_weighted(SimpleScore::of(2), |l: &Lesson| l.room as i64)
        .as_constraint("Room number");
    assert_eq!(
        evaluate(vec![long, rooms], &facts),
        SimpleScore::of(260 - 2 * (1 + 1 + 1 + 2 + 3 + 3))
    );
}
