//! Node-level tests driving single nodes with hand-built signals.

use std::collections::BTreeMap;
use std::sync::Arc;

use scoreforge_core::{ConstraintRef, ImpactType, SimpleScore};

use super::*;
use crate::index::{Comparison, EqualKey, RangeKey};
use crate::stream::collector;
use crate::stream::function::JoinerComponent;
use crate::tuple::{Element, TupleView};

// ============================================================================
// Harness
// ============================================================================

fn ints(values: &[i64]) -> Tuple {
    values.iter().map(|&v| Element::value(v)).collect()
}

fn read(facts: &Facts, tuple: &Tuple) -> Vec<i64> {
    let view = TupleView::new(facts, tuple);
    (0..view.arity()).map(|i| *view.get::<i64>(i)).collect()
}

/// Mirror of what a downstream node would hold.
#[derive(Default)]
struct Downstream {
    live: BTreeMap<usize, Vec<i64>>,
    inserts: usize,
    updates: usize,
    retracts: usize,
}

impl Downstream {
    fn receive(&mut self, facts: &Facts, ops: Vec<TupleOp>) {
        for op in ops {
            match op {
                TupleOp::Insert { slot, tuple } => {
                    assert!(self.live.insert(slot, read(facts, &tuple)).is_none());
                    self.inserts += 1;
                }
                TupleOp::Update { slot, tuple } => {
                    assert!(self.live.insert(slot, read(facts, &tuple)).is_some());
                    self.updates += 1;
                }
                TupleOp::Retract { slot } => {
                    assert!(self.live.remove(&slot).is_some());
                    self.retracts += 1;
                }
            }
        }
    }

    fn sorted(&self) -> Vec<Vec<i64>> {
        let mut tuples: Vec<_> = self.live.values().cloned().collect();
        tuples.sort();
        tuples
    }

    fn reset_counts(&mut self) {
        self.inserts = 0;
        self.updates = 0;
        self.retracts = 0;
    }
}

struct Rig {
    node: Box<dyn Node>,
    facts: Facts,
    down: Downstream,
}

impl Rig {
    fn new(node: Box<dyn Node>) -> Self {
        Self {
            node,
            facts: Facts::new(),
            down: Downstream::default(),
        }
    }

    fn flush(&mut self, signals: Vec<(Port, TupleOp)>) {
        let inbox = signals
            .into_iter()
            .map(|(port, op)| Signal { port, op })
            .collect();
        apply_inbox(self.node.as_mut(), inbox, &self.facts).unwrap();
        let mut emitted = Vec::new();
        self.node.propagate(&mut emitted).unwrap();
        self.down.receive(&self.facts, emitted);
        self.node.check_quiescent().unwrap();
        assert_eq!(self.node.live_tuples(), self.down.live.len());
    }
}

fn insert(port: Port, slot: usize, values: &[i64]) -> (Port, TupleOp) {
    (
        port,
        TupleOp::Insert {
            slot,
            tuple: ints(values),
        },
    )
}

fn update(port: Port, slot: usize, values: &[i64]) -> (Port, TupleOp) {
    (
        port,
        TupleOp::Update {
            slot,
            tuple: ints(values),
        },
    )
}

fn retract(port: Port, slot: usize) -> (Port, TupleOp) {
    (port, TupleOp::Retract { slot })
}

use Port::{Left as L, Right as R};

fn equal_on(left: usize, right: usize) -> JoinerComponent {
    JoinerComponent::Equal {
        left: Arc::new(move |t: &TupleView<'_>| EqualKey::new(*t.get::<i64>(left))),
        right: Arc::new(move |t: &TupleView<'_>| EqualKey::new(*t.get::<i64>(right))),
    }
}

fn compare_on(op: Comparison, left: usize, right: usize) -> JoinerComponent {
    JoinerComponent::Compare {
        op,
        left: Arc::new(move |t: &TupleView<'_>| RangeKey::new(*t.get::<i64>(left))),
        right: Arc::new(move |t: &TupleView<'_>| RangeKey::new(*t.get::<i64>(right))),
    }
}

// ============================================================================
// Filter
// ============================================================================

#[test]
fn test_filter_transitions() {
    let node = FilterNode::new(Arc::new(|t: &TupleView<'_>| *t.get::<i64>(0) > 0));
    let mut rig = Rig::new(Box::new(node));

    rig.flush(vec![insert(L, 0, &[1]), insert(L, 1, &[-1])]);
    assert_eq!(rig.down.sorted(), vec![vec![1]]);

    rig.flush(vec![update(L, 0, &[-5]), update(L, 1, &[5])]);
    assert_eq!(rig.down.sorted(), vec![vec![5]]);
    assert!(rig.down.live.contains_key(&1));

    rig.down.reset_counts();
    rig.flush(vec![update(L, 1, &[6]), update(L, 0, &[-6])]);
    assert_eq!(rig.down.updates, 1);
    assert_eq!(rig.down.inserts + rig.down.retracts, 0);

    rig.flush(vec![retract(L, 0), retract(L, 1)]);
    assert!(rig.down.live.is_empty());
}

// ============================================================================
// Map / flatten
// ============================================================================

#[test]
fn test_map_updates_in_place() {
    let node = MapNode::new(Arc::new(|t: &TupleView<'_>| {
        Arc::new(*t.get::<i64>(0) * 10) as Arc<dyn crate::tuple::Value>
    }));
    let mut rig = Rig::new(Box::new(node));

    rig.flush(vec![insert(L, 4, &[1, 99])]);
    assert_eq!(rig.down.sorted(), vec![vec![10]]);

    rig.down.reset_counts();
    rig.flush(vec![update(L, 4, &[2, 99])]);
    assert_eq!(rig.down.sorted(), vec![vec![20]]);
    assert_eq!(rig.down.updates, 1);

    rig.flush(vec![retract(L, 4)]);
    assert!(rig.down.live.is_empty());
}

#[test]
fn test_flatten_grows_and_shrinks_positionally() {
    // [prefix, n] -> [prefix, 0], [prefix, 1], ... [prefix, n - 1]
    let node = FlattenLastNode::new(Arc::new(|t: &TupleView<'_>| {
        (0..*t.get::<i64>(1))
            .map(|i| Arc::new(i) as Arc<dyn crate::tuple::Value>)
            .collect()
    }));
    let mut rig = Rig::new(Box::new(node));

    rig.flush(vec![insert(L, 0, &[7, 2])]);
    assert_eq!(rig.down.sorted(), vec![vec![7, 0], vec![7, 1]]);

    rig.down.reset_counts();
    rig.flush(vec![update(L, 0, &[7, 3])]);
    assert_eq!(rig.down.sorted(), vec![vec![7, 0], vec![7, 1], vec![7, 2]]);
    assert_eq!((rig.down.inserts, rig.down.updates), (1, 2));

    rig.down.reset_counts();
    rig.flush(vec![update(L, 0, &[8, 1])]);
    assert_eq!(rig.down.sorted(), vec![vec![8, 0]]);
    assert_eq!((rig.down.updates, rig.down.retracts), (1, 2));

    rig.flush(vec![insert(L, 1, &[9, 0])]);
    assert_eq!(rig.down.live.len(), 1);
}

// ============================================================================
// Join
// ============================================================================

#[test]
fn test_equal_join_pairs_and_rekeys() {
    let plan = Arc::new(JoinPlan::new(&[equal_on(0, 0)]));
    let mut rig = Rig::new(Box::new(JoinNode::new(plan)));

    rig.flush(vec![
        insert(L, 0, &[1, 10]),
        insert(L, 1, &[2, 11]),
        insert(R, 0, &[1, 20]),
        insert(R, 1, &[1, 21]),
    ]);
    assert_eq!(
        rig.down.sorted(),
        vec![vec![1, 10, 1, 20], vec![1, 10, 1, 21]]
    );

    // key change on the right moves the pair to the other left tuple
    rig.flush(vec![update(R, 1, &[2, 21])]);
    assert_eq!(
        rig.down.sorted(),
        vec![vec![1, 10, 1, 20], vec![2, 11, 2, 21]]
    );

    // same key: pairs are updated, not recreated
    rig.down.reset_counts();
    rig.flush(vec![update(L, 0, &[1, 12])]);
    assert_eq!((rig.down.updates, rig.down.inserts, rig.down.retracts), (1, 0, 0));
    assert!(rig.down.sorted().contains(&vec![1, 12, 1, 20]));

    rig.flush(vec![retract(L, 0), retract(R, 1)]);
    assert!(rig.down.live.is_empty());
}

#[test]
fn test_range_join_with_residual() {
    // left[0] < right[0] and left[1] != right[1]
    let residual = JoinerComponent::Filter(Arc::new(|l: &TupleView<'_>, r: &TupleView<'_>| {
        l.get::<i64>(1) != r.get::<i64>(1)
    }));
    let plan = Arc::new(JoinPlan::new(&[
        compare_on(Comparison::LessThan, 0, 0),
        residual,
    ]));
    assert!(plan.has_residual());
    let mut rig = Rig::new(Box::new(JoinNode::new(plan)));

    rig.flush(vec![
        insert(L, 0, &[5, 0]),
        insert(R, 0, &[3, 1]),
        insert(R, 1, &[7, 0]),
        insert(R, 2, &[9, 1]),
    ]);
    assert_eq!(rig.down.sorted(), vec![vec![5, 0, 9, 1]]);

    // residual flips for the [7, _] partner
    rig.flush(vec![update(R, 1, &[7, 2])]);
    assert_eq!(rig.down.sorted(), vec![vec![5, 0, 7, 2], vec![5, 0, 9, 1]]);

    rig.flush(vec![update(L, 0, &[5, 1])]);
    assert_eq!(rig.down.sorted(), vec![vec![5, 1, 7, 2]]);
}

#[test]
fn test_cross_join_and_second_comparison() {
    let plan = Arc::new(JoinPlan::new(&[]));
    let mut rig = Rig::new(Box::new(JoinNode::new(plan)));
    rig.flush(vec![insert(L, 0, &[1]), insert(L, 1, &[2]), insert(R, 0, &[3])]);
    assert_eq!(rig.down.live.len(), 2);

    // the second comparison becomes a residual check
    let plan = Arc::new(JoinPlan::new(&[
        compare_on(Comparison::LessThanOrEqual, 0, 0),
        compare_on(Comparison::GreaterThan, 0, 1),
    ]));
    assert!(plan.has_residual());
    let mut rig = Rig::new(Box::new(JoinNode::new(plan)));
    rig.flush(vec![
        insert(L, 0, &[5]),
        insert(R, 0, &[5, 4]),
        insert(R, 1, &[6, 6]),
        insert(R, 2, &[4, 0]),
    ]);
    assert_eq!(rig.down.sorted(), vec![vec![5, 5, 4]]);
}

// ============================================================================
// Exists
// ============================================================================

#[test]
fn test_if_exists_toggles_on_zero_crossing() {
    let plan = Arc::new(JoinPlan::new(&[equal_on(0, 0)]));
    let mut rig = Rig::new(Box::new(ExistsNode::new(plan, true)));

    rig.flush(vec![insert(L, 0, &[1]), insert(L, 1, &[2])]);
    assert!(rig.down.live.is_empty());

    rig.flush(vec![insert(R, 0, &[1]), insert(R, 1, &[1])]);
    assert_eq!(rig.down.sorted(), vec![vec![1]]);

    rig.down.reset_counts();
    rig.flush(vec![retract(R, 0)]);
    assert_eq!(rig.down.sorted(), vec![vec![1]]);
    assert_eq!(rig.down.inserts + rig.down.retracts + rig.down.updates, 0);

    // moving the last blocker retracts one tuple and admits the other
    rig.flush(vec![update(R, 1, &[2])]);
    assert_eq!(rig.down.sorted(), vec![vec![2]]);

    rig.flush(vec![retract(R, 1)]);
    assert!(rig.down.live.is_empty());
}

#[test]
fn test_if_not_exists_with_left_key_change() {
    let plan = Arc::new(JoinPlan::new(&[equal_on(0, 0)]));
    let mut rig = Rig::new(Box::new(ExistsNode::new(plan, false)));

    rig.flush(vec![insert(L, 0, &[1, 0]), insert(R, 0, &[1])]);
    assert!(rig.down.live.is_empty());

    rig.flush(vec![update(L, 0, &[3, 0])]);
    assert_eq!(rig.down.sorted(), vec![vec![3, 0]]);

    rig.down.reset_counts();
    rig.flush(vec![update(L, 0, &[3, 1])]);
    assert_eq!(rig.down.updates, 1);
    assert_eq!(rig.down.sorted(), vec![vec![3, 1]]);

    rig.flush(vec![insert(R, 1, &[3])]);
    assert!(rig.down.live.is_empty());

    rig.flush(vec![retract(L, 0)]);
    rig.flush(vec![retract(R, 0), retract(R, 1)]);
    assert!(rig.down.live.is_empty());
}

// ============================================================================
// Group-by
// ============================================================================

fn grouping<C: crate::stream::collector::Collector<(i64, i64)>>(
    collector: C,
    output: GroupOutput,
) -> Box<dyn Node> {
    let key: crate::stream::function::TupleFn<i64> =
        Arc::new(|t: &TupleView<'_>| *t.get::<i64>(0));
    Grouping::<(i64, i64), i64, C>::new(key, collector, output).instantiate()
}

#[test]
fn test_group_count_updates_in_place() {
    let node = grouping(collector::count(), GroupOutput::KeyAndResult);
    let mut rig = Rig::new(node);

    rig.flush(vec![
        insert(L, 0, &[1, 0]),
        insert(L, 1, &[1, 0]),
        insert(L, 2, &[1, 0]),
        insert(L, 3, &[2, 0]),
    ]);
    assert_eq!(rig.down.live.len(), 2);

    rig.down.reset_counts();
    rig.flush(vec![retract(L, 2)]);
    assert_eq!(rig.down.updates, 1);
    assert_eq!(rig.down.inserts + rig.down.retracts, 0);

    // moving a member between groups in one flush
    rig.down.reset_counts();
    rig.flush(vec![update(L, 1, &[2, 0])]);
    assert_eq!(rig.down.updates, 2);

    rig.flush(vec![retract(L, 0)]);
    assert_eq!(rig.down.live.len(), 1);
}

#[test]
fn test_group_unchanged_result_is_silent() {
    let sum = collector::bi::sum(|_: &i64, b: &i64| *b);
    let mut rig = Rig::new(grouping(sum, GroupOutput::KeyAndResult));

    rig.flush(vec![insert(L, 0, &[1, 5]), insert(L, 1, &[1, 0])]);
    rig.down.reset_counts();
    rig.flush(vec![update(L, 1, &[1, 0])]);
    rig.flush(vec![insert(L, 2, &[1, 0])]);
    rig.flush(vec![retract(L, 1)]);
    assert_eq!(rig.down.inserts + rig.down.updates + rig.down.retracts, 0);

    rig.flush(vec![update(L, 2, &[1, 2])]);
    assert_eq!(rig.down.updates, 1);
    assert_eq!(rig.down.sorted(), vec![vec![1, 7]]);
}

#[test]
fn test_group_key_output_ignores_result_changes() {
    let mut rig = Rig::new(grouping(collector::count(), GroupOutput::Key));
    rig.flush(vec![insert(L, 0, &[4, 0])]);
    rig.down.reset_counts();
    rig.flush(vec![insert(L, 1, &[4, 0])]);
    assert_eq!(rig.down.inserts + rig.down.updates, 0);
    assert_eq!(rig.down.sorted(), vec![vec![4]]);

    rig.flush(vec![retract(L, 0), retract(L, 1)]);
    assert!(rig.down.live.is_empty());
}

// ============================================================================
// Scorer
// ============================================================================

#[test]
fn test_scorer_keeps_running_total() {
    let facts = Facts::new();
    let mut scorer = Scorer::new(
        ConstraintRef::new("", "Weighted"),
        ImpactType::Penalty,
        Impact::Weighted(
            SimpleScore::of(2),
            Arc::new(|t: &TupleView<'_>| *t.get::<i64>(0)),
        ),
        true,
    );

    scorer
        .apply(
            vec![
                TupleOp::Insert { slot: 0, tuple: ints(&[3]) },
                TupleOp::Insert { slot: 1, tuple: ints(&[1]) },
            ],
            &facts,
        )
        .unwrap();
    assert_eq!(scorer.total(), SimpleScore::of(-8));
    assert_eq!(scorer.match_count(), 2);

    scorer
        .apply(
            vec![
                TupleOp::Insert { slot: 2, tuple: ints(&[10]) },
                TupleOp::Update { slot: 0, tuple: ints(&[4]) },
                TupleOp::Retract { slot: 1 },
            ],
            &facts,
        )
        .unwrap();
    assert_eq!(scorer.total(), SimpleScore::of(-28));
    assert!(scorer.matches().all(|m| m.tuple.is_some()));
    scorer.check_total().unwrap();

    let err = scorer
        .apply(vec![TupleOp::Retract { slot: 1 }], &facts)
        .unwrap_err();
    assert!(err.to_string().contains("Impossible state"));
}

#[test]
fn test_impact_reweighting() {
    let fixed: Impact<SimpleScore> = Impact::Fixed(SimpleScore::of(1));
    assert_eq!(
        fixed.reweighted(SimpleScore::of(5)).and_then(|i| i.weight()),
        Some(SimpleScore::of(5))
    );
    let dynamic: Impact<SimpleScore> =
        Impact::Dynamic(Arc::new(|t: &TupleView<'_>| SimpleScore::of(*t.get::<i64>(0))));
    assert!(dynamic.weight().is_none());
    assert!(dynamic.reweighted(SimpleScore::of(5)).is_none());
}

// ============================================================================
// For-each
// ============================================================================

#[test]
fn test_for_each_protocol() {
    let mut facts = Facts::new();
    let a = facts.insert(1_i64).id();
    let b = facts.insert(2_i64).id();
    let mut node = ForEachNode::new("i64");

    node.insert(a).unwrap();
    node.insert(b).unwrap();
    assert!(node.insert(a).is_err());
    node.retract(b).unwrap();
    let mut emitted = Vec::new();
    node.propagate(&mut emitted).unwrap();
    assert_eq!(emitted.len(), 1);
    assert_eq!(node.live_tuples(), 1);
    node.check_quiescent().unwrap();

    assert!(node.update(b).is_err());
    node.update(a).unwrap();
    emitted.clear();
    node.propagate(&mut emitted).unwrap();
    assert!(matches!(emitted.as_slice(), [TupleOp::Update { .. }]));
}
