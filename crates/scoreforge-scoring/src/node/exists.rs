use std::sync::Arc;

use indexmap::IndexSet;

use super::join::{side_of, JoinPlan};
use super::{Node, NodeKind, Port, TupleOp};
use crate::error::{impossible, Result};
use crate::fact::Facts;
use crate::index::{IndexKey, Indexer};
use crate::tuple::{InputStore, Outbound, Tuple, TupleView};

struct Gated {
    tuple: Tuple,
    key: IndexKey,
    /// Right handles currently matching this left tuple.
    matches: IndexSet<usize>,
    out: Option<usize>,
}

struct Blocker {
    tuple: Tuple,
    key: IndexKey,
    matches: IndexSet<usize>,
}

/// Forwards a left tuple iff at least one (if-exists) or no (if-not-exists)
/// right tuple matches it.
///
/// Only the number of matches matters: a right-side change toggles a left
/// tuple when its match count crosses zero and is otherwise invisible
/// downstream.
pub(crate) struct ExistsNode {
    plan: Arc<JoinPlan>,
    should_exist: bool,
    left: InputStore<Gated>,
    right: InputStore<Blocker>,
    indexes: [Indexer; 2],
    out: Outbound<()>,
}

impl ExistsNode {
    pub(crate) fn new(plan: Arc<JoinPlan>, should_exist: bool) -> Self {
        let indexes = [plan.indexer(Port::Left), plan.indexer(Port::Right)];
        Self {
            plan,
            should_exist,
            left: InputStore::new(),
            right: InputStore::new(),
            indexes,
            out: Outbound::new(),
        }
    }
}

/// Opens or closes the gate of one left tuple after its matches changed.
fn gate(out: &mut Outbound<()>, should_exist: bool, gated: &mut Gated) -> Result<()> {
    let pass = !gated.matches.is_empty() == should_exist;
    match (gated.out, pass) {
        (None, true) => gated.out = Some(out.create(gated.tuple.clone(), ())),
        (Some(slot), false) => {
            out.retract(slot)?;
            gated.out = None;
        }
        _ => {}
    }
    Ok(())
}

impl ExistsNode {
    fn insert_left(&mut self, slot: usize, tuple: Tuple, facts: &Facts) -> Result<()> {
        let key = self.plan.key(Port::Left, &TupleView::new(facts, &tuple));
        let mut gated = Gated {
            tuple,
            key,
            matches: IndexSet::new(),
            out: None,
        };
        for right_slot in self.indexes[1].matches(&gated.key) {
            let blocker = self.right.get_mut(right_slot)?;
            if self
                .plan
                .accepts_from(Port::Left, facts, &gated.tuple, &blocker.tuple)
            {
                blocker.matches.insert(slot);
                gated.matches.insert(right_slot);
            }
        }
        self.indexes[0].put(&gated.key, slot)?;
        gate(&mut self.out, self.should_exist, &mut gated)?;
        self.left.insert(slot, gated)
    }

    fn update_left(&mut self, slot: usize, tuple: Tuple, facts: &Facts) -> Result<()> {
        let key = self.plan.key(Port::Left, &TupleView::new(facts, &tuple));
        let gated = self.left.get_mut(slot)?;
        gated.tuple = tuple;
        let rematch = gated.key != key || self.plan.has_residual();
        if gated.key != key {
            self.indexes[0].remove(&gated.key, slot)?;
            self.indexes[0].put(&key, slot)?;
            gated.key = key;
        }
        if rematch {
            for right_slot in gated.matches.drain(..) {
                self.right.get_mut(right_slot)?.matches.swap_remove(&slot);
            }
            for right_slot in self.indexes[1].matches(&gated.key) {
                let blocker = self.right.get_mut(right_slot)?;
                if self
                    .plan
                    .accepts_from(Port::Left, facts, &gated.tuple, &blocker.tuple)
                {
                    blocker.matches.insert(slot);
                    gated.matches.insert(right_slot);
                }
            }
        }
        match gated.out {
            Some(out) if !gated.matches.is_empty() == self.should_exist => {
                self.out.update_elements(out, gated.tuple.clone())
            }
            _ => gate(&mut self.out, self.should_exist, gated),
        }
    }

    fn retract_left(&mut self, slot: usize) -> Result<()> {
        let gated = self.left.remove(slot)?;
        self.indexes[0].remove(&gated.key, slot)?;
        for right_slot in gated.matches {
            self.right.get_mut(right_slot)?.matches.swap_remove(&slot);
        }
        match gated.out {
            Some(out) => self.out.retract(out),
            None => Ok(()),
        }
    }

    /// Left handles a right tuple matches under its current key.
    fn scan_left(&self, facts: &Facts, blocker: &Blocker) -> Result<IndexSet<usize>> {
        let mut found = IndexSet::new();
        for left_slot in self.indexes[0].matches(&blocker.key) {
            let gated = self.left.get(left_slot)?;
            if self
                .plan
                .accepts_from(Port::Right, facts, &blocker.tuple, &gated.tuple)
            {
                found.insert(left_slot);
            }
        }
        Ok(found)
    }

    fn link(&mut self, right_slot: usize, left_slot: usize) -> Result<()> {
        let gated = self.left.get_mut(left_slot)?;
        gated.matches.insert(right_slot);
        if gated.matches.len() == 1 {
            gate(&mut self.out, self.should_exist, gated)?;
        }
        Ok(())
    }

    fn unlink(&mut self, right_slot: usize, left_slot: usize) -> Result<()> {
        let gated = self.left.get_mut(left_slot)?;
        gated.matches.swap_remove(&right_slot);
        if gated.matches.is_empty() {
            gate(&mut self.out, self.should_exist, gated)?;
        }
        Ok(())
    }

    fn insert_right(&mut self, slot: usize, tuple: Tuple, facts: &Facts) -> Result<()> {
        let key = self.plan.key(Port::Right, &TupleView::new(facts, &tuple));
        let mut blocker = Blocker {
            tuple,
            key,
            matches: IndexSet::new(),
        };
        blocker.matches = self.scan_left(facts, &blocker)?;
        for &left_slot in &blocker.matches {
            self.link(slot, left_slot)?;
        }
        self.indexes[1].put(&blocker.key, slot)?;
        self.right.insert(slot, blocker)
    }

    fn update_right(&mut self, slot: usize, tuple: Tuple, facts: &Facts) -> Result<()> {
        let key = self.plan.key(Port::Right, &TupleView::new(facts, &tuple));
        let blocker = self.right.get_mut(slot)?;
        blocker.tuple = tuple;
        if blocker.key != key {
            self.indexes[1].remove(&blocker.key, slot)?;
            self.indexes[1].put(&key, slot)?;
            blocker.key = key;
        } else if !self.plan.has_residual() {
            return Ok(());
        }
        let blocker = self.right.remove(slot)?;
        let found = self.scan_left(facts, &blocker)?;
        for &left_slot in blocker.matches.difference(&found) {
            self.unlink(slot, left_slot)?;
        }
        for &left_slot in found.difference(&blocker.matches) {
            self.link(slot, left_slot)?;
        }
        self.right.insert(
            slot,
            Blocker {
                matches: found,
                ..blocker
            },
        )
    }

    fn retract_right(&mut self, slot: usize) -> Result<()> {
        let blocker = self.right.remove(slot)?;
        self.indexes[1].remove(&blocker.key, slot)?;
        for left_slot in blocker.matches {
            self.unlink(slot, left_slot)?;
        }
        Ok(())
    }
}

impl Node for ExistsNode {
    fn kind(&self) -> NodeKind {
        NodeKind::IfExists
    }

    fn insert(&mut self, port: Port, slot: usize, tuple: Tuple, facts: &Facts) -> Result<()> {
        match port {
            Port::Left => self.insert_left(slot, tuple, facts),
            Port::Right => self.insert_right(slot, tuple, facts),
        }
    }

    fn update(&mut self, port: Port, slot: usize, tuple: Tuple, facts: &Facts) -> Result<()> {
        match port {
            Port::Left => self.update_left(slot, tuple, facts),
            Port::Right => self.update_right(slot, tuple, facts),
        }
    }

    fn retract(&mut self, port: Port, slot: usize) -> Result<()> {
        match port {
            Port::Left => self.retract_left(slot),
            Port::Right => self.retract_right(slot),
        }
    }

    fn propagate(&mut self, emit: &mut Vec<TupleOp>) -> Result<()> {
        self.out.propagate(emit)
    }

    fn live_tuples(&self) -> usize {
        self.out.active_count()
    }

    fn check_quiescent(&self) -> Result<()> {
        self.out.check_quiescent()?;
        for (slot, gated) in self.left.iter() {
            let pass = !gated.matches.is_empty() == self.should_exist;
            if pass != gated.out.is_some() {
                return Err(impossible(format!(
                    "left tuple {} has {} matches but its gate is {}",
                    slot,
                    gated.matches.len(),
                    if gated.out.is_some() { "open" } else { "closed" }
                )));
            }
        }
        let (left_i, right_i) = side_of(Port::Left);
        if self.indexes[left_i].len() != self.left.len()
            || self.indexes[right_i].len() != self.right.len()
        {
            return Err(impossible("if-exists index out of sync with its inputs"));
        }
        Ok(())
    }
}
