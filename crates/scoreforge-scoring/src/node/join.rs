use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::{Node, NodeKind, Port, TupleOp};
use crate::error::{impossible, Result};
use crate::fact::Facts;
use crate::index::{Comparison, EqualKey, IndexKey, Indexer, RangeKey};
use crate::stream::function::{JoinerComponent, PairPredicate, TupleFn};
use crate::tuple::{concat, Element, InputStore, Outbound, Tuple, TupleView};

/// Index layout derived from a joiner.
///
/// Every equality component becomes part of the hash key, the first
/// comparison orders the hash buckets, and the remaining components are
/// checked pair by pair after the index lookup.
pub(crate) struct JoinPlan {
    equal: Vec<(TupleFn<EqualKey>, TupleFn<EqualKey>)>,
    range: Option<(Comparison, TupleFn<RangeKey>, TupleFn<RangeKey>)>,
    residual: Vec<PairPredicate>,
}

impl JoinPlan {
    pub(crate) fn new(components: &[JoinerComponent]) -> Self {
        let mut plan = JoinPlan {
            equal: Vec::new(),
            range: None,
            residual: Vec::new(),
        };
        for component in components {
            match component {
                JoinerComponent::Equal { left, right } => {
                    plan.equal.push((left.clone(), right.clone()));
                }
                JoinerComponent::Compare { op, left, right } if plan.range.is_none() => {
                    plan.range = Some((*op, left.clone(), right.clone()));
                }
                JoinerComponent::Compare { op, left, right } => {
                    let (op, left, right) = (*op, left.clone(), right.clone());
                    plan.residual.push(Arc::new(
                        move |l: &TupleView<'_>, r: &TupleView<'_>| op.test(&left(l), &right(r)),
                    ));
                }
                JoinerComponent::Filter(predicate) => plan.residual.push(predicate.clone()),
            }
        }
        plan
    }

    pub(crate) fn has_residual(&self) -> bool {
        !self.residual.is_empty()
    }

    pub(crate) fn key(&self, port: Port, view: &TupleView<'_>) -> IndexKey {
        let equal = self
            .equal
            .iter()
            .map(|(left, right)| match port {
                Port::Left => left(view),
                Port::Right => right(view),
            })
            .collect();
        let range = self.range.as_ref().map(|(_, left, right)| match port {
            Port::Left => left(view),
            Port::Right => right(view),
        });
        IndexKey { equal, range }
    }

    /// Indexer for the tuples arriving on `port`.
    pub(crate) fn indexer(&self, port: Port) -> Indexer {
        let stored = self.range.as_ref().map(|(op, _, _)| match port {
            Port::Left => *op,
            Port::Right => op.flip(),
        });
        Indexer::new(stored)
    }

    pub(crate) fn accepts(&self, left: &TupleView<'_>, right: &TupleView<'_>) -> bool {
        self.residual.iter().all(|predicate| predicate(left, right))
    }

    /// Residual check with the operands given from `port`'s point of view.
    pub(crate) fn accepts_from(
        &self,
        port: Port,
        facts: &Facts,
        this: &[Element],
        other: &[Element],
    ) -> bool {
        if self.residual.is_empty() {
            return true;
        }
        let this = TupleView::new(facts, this);
        let other = TupleView::new(facts, other);
        match port {
            Port::Left => self.accepts(&this, &other),
            Port::Right => self.accepts(&other, &this),
        }
    }
}

pub(crate) fn side_of(port: Port) -> (usize, usize) {
    match port {
        Port::Left => (0, 1),
        Port::Right => (1, 0),
    }
}

struct JoinSide {
    tuple: Tuple,
    key: IndexKey,
    /// Partner handle on the other side -> output tuple.
    outs: IndexMap<usize, usize>,
}

fn pair_elements(port: Port, this: &[Element], other: &[Element]) -> Tuple {
    match port {
        Port::Left => concat(this, other),
        Port::Right => concat(other, this),
    }
}

/// Pairs every left tuple with every matching right tuple.
pub(crate) struct JoinNode {
    plan: Arc<JoinPlan>,
    sides: [InputStore<JoinSide>; 2],
    indexes: [Indexer; 2],
    out: Outbound<()>,
}

impl JoinNode {
    pub(crate) fn new(plan: Arc<JoinPlan>) -> Self {
        let indexes = [plan.indexer(Port::Left), plan.indexer(Port::Right)];
        Self {
            plan,
            sides: [InputStore::new(), InputStore::new()],
            indexes,
            out: Outbound::new(),
        }
    }
}

impl Node for JoinNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Join
    }

    fn insert(&mut self, port: Port, slot: usize, tuple: Tuple, facts: &Facts) -> Result<()> {
        let key = self.plan.key(port, &TupleView::new(facts, &tuple));
        let (this_i, other_i) = side_of(port);
        let [left, right] = &mut self.sides;
        let (this, other) = match port {
            Port::Left => (left, right),
            Port::Right => (right, left),
        };
        let mut outs = IndexMap::new();
        for other_slot in self.indexes[other_i].matches(&key) {
            let partner = other.get_mut(other_slot)?;
            if self.plan.accepts_from(port, facts, &tuple, &partner.tuple) {
                let out = self
                    .out
                    .create(pair_elements(port, &tuple, &partner.tuple), ());
                partner.outs.insert(slot, out);
                outs.insert(other_slot, out);
            }
        }
        self.indexes[this_i].put(&key, slot)?;
        this.insert(slot, JoinSide { tuple, key, outs })
    }

    fn update(&mut self, port: Port, slot: usize, tuple: Tuple, facts: &Facts) -> Result<()> {
        let key = self.plan.key(port, &TupleView::new(facts, &tuple));
        let (this_i, other_i) = side_of(port);
        if self.sides[this_i].get(slot)?.key != key {
            self.retract(port, slot)?;
            return self.insert(port, slot, tuple, facts);
        }

        let [left, right] = &mut self.sides;
        let (this, other) = match port {
            Port::Left => (left, right),
            Port::Right => (right, left),
        };
        let side = this.get_mut(slot)?;
        side.tuple = tuple;

        if !self.plan.has_residual() {
            for (&other_slot, &out) in &side.outs {
                let partner = other.get(other_slot)?;
                self.out
                    .update_elements(out, pair_elements(port, &side.tuple, &partner.tuple))?;
            }
            return Ok(());
        }

        let candidates: SmallVec<[usize; 8]> = self.indexes[other_i].matches(&side.key);
        for other_slot in candidates {
            let partner = other.get_mut(other_slot)?;
            let matched = self
                .plan
                .accepts_from(port, facts, &side.tuple, &partner.tuple);
            match (side.outs.get(&other_slot).copied(), matched) {
                (Some(out), true) => {
                    self.out
                        .update_elements(out, pair_elements(port, &side.tuple, &partner.tuple))?;
                }
                (Some(out), false) => {
                    side.outs.swap_remove(&other_slot);
                    partner.outs.swap_remove(&slot);
                    self.out.retract(out)?;
                }
                (None, true) => {
                    let out = self
                        .out
                        .create(pair_elements(port, &side.tuple, &partner.tuple), ());
                    side.outs.insert(other_slot, out);
                    partner.outs.insert(slot, out);
                }
                (None, false) => {}
            }
        }
        Ok(())
    }

    fn retract(&mut self, port: Port, slot: usize) -> Result<()> {
        let (this_i, _) = side_of(port);
        let [left, right] = &mut self.sides;
        let (this, other) = match port {
            Port::Left => (left, right),
            Port::Right => (right, left),
        };
        let side = this.remove(slot)?;
        self.indexes[this_i].remove(&side.key, slot)?;
        for (other_slot, out) in side.outs {
            other.get_mut(other_slot)?.outs.swap_remove(&slot);
            self.out.retract(out)?;
        }
        Ok(())
    }

    fn propagate(&mut self, emit: &mut Vec<TupleOp>) -> Result<()> {
        self.out.propagate(emit)
    }

    fn live_tuples(&self) -> usize {
        self.out.active_count()
    }

    fn check_quiescent(&self) -> Result<()> {
        self.out.check_quiescent()?;
        let pairs: usize = self.sides[0].iter().map(|(_, side)| side.outs.len()).sum();
        if pairs != self.out.active_count() {
            return Err(impossible(format!(
                "join tracks {} pairs but holds {} output tuples",
                pairs,
                self.out.active_count()
            )));
        }
        Ok(())
    }
}
