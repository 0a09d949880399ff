use super::{Node, NodeKind, Port, TupleOp};
use crate::error::{impossible, Result};
use crate::fact::Facts;
use crate::stream::function::Predicate;
use crate::tuple::{InputStore, Tuple, TupleView};

/// Passes through the upstream tuples that satisfy a predicate.
///
/// Filters create no tuples of their own: a passing tuple keeps its
/// upstream slot handle, and only the pass/fail bit is remembered so an
/// update can turn into an insert or a retract.
pub(crate) struct FilterNode {
    predicate: Predicate,
    passed: InputStore<bool>,
    pending: Vec<TupleOp>,
    live: usize,
}

impl FilterNode {
    pub(crate) fn new(predicate: Predicate) -> Self {
        Self {
            predicate,
            passed: InputStore::new(),
            pending: Vec::new(),
            live: 0,
        }
    }

    fn test(&self, tuple: &Tuple, facts: &Facts) -> bool {
        (self.predicate)(&TupleView::new(facts, tuple))
    }
}

impl Node for FilterNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Filter
    }

    fn insert(&mut self, _port: Port, slot: usize, tuple: Tuple, facts: &Facts) -> Result<()> {
        let pass = self.test(&tuple, facts);
        self.passed.insert(slot, pass)?;
        if pass {
            self.live += 1;
            self.pending.push(TupleOp::Insert { slot, tuple });
        }
        Ok(())
    }

    fn update(&mut self, _port: Port, slot: usize, tuple: Tuple, facts: &Facts) -> Result<()> {
        let now = self.test(&tuple, facts);
        let passed = self.passed.get_mut(slot)?;
        let op = match (*passed, now) {
            (false, false) => None,
            (false, true) => {
                self.live += 1;
                Some(TupleOp::Insert { slot, tuple })
            }
            (true, false) => {
                self.live -= 1;
                Some(TupleOp::Retract { slot })
            }
            (true, true) => Some(TupleOp::Update { slot, tuple }),
        };
        *passed = now;
        self.pending.extend(op);
        Ok(())
    }

    fn retract(&mut self, _port: Port, slot: usize) -> Result<()> {
        if self.passed.remove(slot)? {
            self.live -= 1;
            self.pending.push(TupleOp::Retract { slot });
        }
        Ok(())
    }

    fn propagate(&mut self, emit: &mut Vec<TupleOp>) -> Result<()> {
        emit.append(&mut self.pending);
        Ok(())
    }

    fn live_tuples(&self) -> usize {
        self.live
    }

    fn check_quiescent(&self) -> Result<()> {
        if !self.pending.is_empty() {
            return Err(impossible("filter signals left undelivered"));
        }
        let passing = self.passed.iter().filter(|(_, pass)| **pass).count();
        if passing != self.live {
            return Err(impossible(format!(
                "filter counts {} live tuples but {} pass",
                self.live, passing
            )));
        }
        Ok(())
    }
}
