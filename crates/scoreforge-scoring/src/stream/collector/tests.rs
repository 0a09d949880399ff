use super::*;
use crate::fact::Facts;
use crate::tuple::Element;

fn view_of<'a>(facts: &'a Facts, elements: &'a [Element]) -> TupleView<'a> {
    TupleView::new(facts, elements)
}

/// Feeds values through a collector and returns each intermediate result.
fn fold<C: Collector<(i64,)>>(collector: &C, ops: &[(bool, i64)]) -> Vec<C::Result> {
    let facts = Facts::new();
    let mut acc = collector.create_accumulator();
    let mut results = Vec::new();
    for &(add, value) in ops {
        let elements = [Element::value(value)];
        let extracted = collector.extract(&view_of(&facts, &elements));
        if add {
            acc.accumulate(&extracted);
        } else {
            acc.retract(&extracted);
        }
        results.push(acc.finish());
    }
    results
}

const ADD: bool = true;
const DEL: bool = false;

#[test]
fn test_count() {
    let results = fold(&count(), &[(ADD, 1), (ADD, 1), (DEL, 1), (DEL, 1)]);
    assert_eq!(results, vec![1, 2, 1, 0]);
}

#[test]
fn test_count_distinct_tracks_multiplicity() {
    let collector = count_distinct(|v: &i64| v % 3);
    let results = fold(&collector, &[(ADD, 1), (ADD, 4), (ADD, 2), (DEL, 1), (DEL, 4)]);
    assert_eq!(results, vec![1, 1, 2, 2, 1]);
}

#[test]
fn test_sum_and_retract() {
    let results = fold(&sum(|v: &i64| *v), &[(ADD, 5), (ADD, -2), (DEL, 5)]);
    assert_eq!(results, vec![5, 3, -2]);
}

#[test]
fn test_average() {
    let results = fold(&average(|v: &i64| *v), &[(ADD, 1), (ADD, 2), (DEL, 1), (DEL, 2)]);
    assert_eq!(results, vec![Some(1.0), Some(1.5), Some(2.0), None]);
}

#[test]
fn test_min_max_fall_back_after_retract() {
    let ops = [(ADD, 3), (ADD, 1), (ADD, 1), (DEL, 1), (DEL, 1), (DEL, 3)];
    assert_eq!(
        fold(&min(|v: &i64| *v), &ops),
        vec![Some(3), Some(1), Some(1), Some(1), Some(3), None]
    );
    assert_eq!(
        fold(&max(|v: &i64| *v), &ops),
        vec![Some(3), Some(3), Some(3), Some(3), Some(3), None]
    );
}

#[test]
fn test_to_list_removes_one_occurrence() {
    let results = fold(&to_list(|v: &i64| *v), &[(ADD, 1), (ADD, 2), (ADD, 1), (DEL, 1)]);
    assert_eq!(results.last().unwrap(), &vec![2, 1]);
}

#[test]
fn test_reset() {
    let collector = sum(|v: &i64| *v);
    let mut acc = <_ as Collector<(i64,)>>::create_accumulator(&collector);
    acc.accumulate(&4);
    acc.reset();
    assert_eq!(acc.finish(), 0);
}

#[test]
fn test_bi_collectors_read_both_elements() {
    let facts = Facts::new();
    let collector = bi::sum(|a: &i64, b: &i64| a * b);
    let elements = [Element::value(3_i64), Element::value(4_i64)];
    let mut acc = collector.create_accumulator();
    acc.accumulate(&collector.extract(&view_of(&facts, &elements)));
    assert_eq!(acc.finish(), 12);
}
