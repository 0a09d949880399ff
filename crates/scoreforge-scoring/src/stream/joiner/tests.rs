use super::*;
use crate::fact::Facts;
use crate::stream::function::JoinerComponent;
use crate::tuple::{Element, TupleView};

#[derive(Clone, Debug)]
struct Slot {
    room: u32,
    start: i64,
    end: i64,
}

fn slot(room: u32, start: i64, end: i64) -> Slot {
    Slot { room, start, end }
}

/// Evaluates every component of a uni-left joiner against one pair.
fn holds(joiner: &Joiner<(Slot,), Slot>, left: &Slot, right: &Slot) -> bool {
    let facts = Facts::new();
    let l = [Element::value(left.clone())];
    let r = [Element::value(right.clone())];
    let lv = TupleView::new(&facts, &l);
    let rv = TupleView::new(&facts, &r);
    joiner.components.iter().all(|component| match component {
        JoinerComponent::Equal { left, right } => left(&lv) == right(&rv),
        JoinerComponent::Compare { op, left, right } => op.test(&left(&lv), &right(&rv)),
        JoinerComponent::Filter(predicate) => predicate(&lv, &rv),
    })
}

// ============================================================================
// Composition
// ============================================================================

#[test]
fn test_cross_is_empty() {
    let joiner: Joiner<(Slot,), Slot> = cross();
    assert!(joiner.is_empty());
    assert!(holds(&joiner, &slot(1, 0, 1), &slot(2, 5, 9)));
}

#[test]
fn test_and_concatenates_components() {
    let joiner = equal(|s: &Slot| s.room)
        .and(less_than(|s: &Slot| s.start, |s: &Slot| s.start))
        .and(filtering(|a: &Slot, b: &Slot| a.end != b.end));
    assert_eq!(joiner.len(), 3);
}

#[test]
fn test_overlapping_expands_to_two_comparisons() {
    let joiner = overlapping(
        |s: &Slot| s.start,
        |s: &Slot| s.end,
        |s: &Slot| s.start,
        |s: &Slot| s.end,
    );
    assert_eq!(joiner.len(), 2);
    assert!(matches!(
        joiner.components[0],
        JoinerComponent::Compare {
            op: crate::index::Comparison::LessThan,
            ..
        }
    ));
}

// ============================================================================
// Evaluation
// ============================================================================

#[test]
fn test_equal() {
    let joiner = equal(|s: &Slot| s.room);
    assert!(holds(&joiner, &slot(1, 0, 1), &slot(1, 5, 6)));
    assert!(!holds(&joiner, &slot(1, 0, 1), &slot(2, 0, 1)));
}

#[test]
fn test_equal_bi_with_different_key_functions() {
    let joiner = equal_bi(|s: &Slot| s.end, |s: &Slot| s.start);
    assert!(holds(&joiner, &slot(1, 0, 5), &slot(1, 5, 9)));
    assert!(!holds(&joiner, &slot(1, 0, 4), &slot(1, 5, 9)));
}

#[test]
fn test_comparisons() {
    let early = slot(1, 0, 1);
    let late = slot(1, 5, 6);
    let lt = less_than(|s: &Slot| s.start, |s: &Slot| s.start);
    let le = less_than_or_equal(|s: &Slot| s.start, |s: &Slot| s.start);
    let gt = greater_than(|s: &Slot| s.start, |s: &Slot| s.start);
    let ge = greater_than_or_equal(|s: &Slot| s.start, |s: &Slot| s.start);

    assert!(holds(&lt, &early, &late));
    assert!(!holds(&lt, &early, &early));
    assert!(holds(&le, &early, &early));
    assert!(holds(&gt, &late, &early));
    assert!(!holds(&gt, &late, &late));
    assert!(holds(&ge, &late, &late));
    assert!(!holds(&ge, &early, &late));
}

#[test]
fn test_overlapping_is_half_open() {
    let joiner = overlapping(
        |s: &Slot| s.start,
        |s: &Slot| s.end,
        |s: &Slot| s.start,
        |s: &Slot| s.end,
    );
    assert!(holds(&joiner, &slot(1, 0, 10), &slot(1, 5, 15)));
    assert!(holds(&joiner, &slot(1, 5, 6), &slot(1, 0, 10)));
    assert!(!holds(&joiner, &slot(1, 0, 10), &slot(1, 10, 20)));
    assert!(!holds(&joiner, &slot(1, 10, 20), &slot(1, 0, 10)));
}

#[test]
fn test_conjunction_requires_every_component() {
    let joiner = equal(|s: &Slot| s.room).and(filtering(|a: &Slot, b: &Slot| a.start < b.start));
    assert!(holds(&joiner, &slot(1, 0, 1), &slot(1, 2, 3)));
    assert!(!holds(&joiner, &slot(1, 2, 3), &slot(1, 0, 1)));
    assert!(!holds(&joiner, &slot(1, 0, 1), &slot(2, 2, 3)));
}

#[test]
fn test_bi_left_side_reads_both_elements() {
    let facts = Facts::new();
    let joiner: Joiner<(u32, i64), Slot> = bi::equal(|room: &u32, _: &i64| *room, |s: &Slot| s.room)
        .and(bi::less_than(|_: &u32, at: &i64| *at, |s: &Slot| s.end));
    let left = [Element::value(1_u32), Element::value(3_i64)];
    let right = [Element::value(slot(1, 0, 5))];
    let lv = TupleView::new(&facts, &left);
    let rv = TupleView::new(&facts, &right);
    let all = joiner.components.iter().all(|component| match component {
        JoinerComponent::Equal { left, right } => left(&lv) == right(&rv),
        JoinerComponent::Compare { op, left, right } => op.test(&left(&lv), &right(&rv)),
        JoinerComponent::Filter(predicate) => predicate(&lv, &rv),
    });
    assert!(all);
}
