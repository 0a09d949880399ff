use std::collections::HashMap;

use super::{NodeKind, TupleOp};
use crate::error::{impossible, Result};
use crate::fact::FactId;
use crate::tuple::{Element, Outbound, Tuple};

/// Source node holding one uni-tuple per live fact of one type.
pub(crate) struct ForEachNode {
    type_name: &'static str,
    by_fact: HashMap<FactId, usize>,
    out: Outbound<FactId>,
}

impl ForEachNode {
    pub(crate) fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            by_fact: HashMap::new(),
            out: Outbound::new(),
        }
    }

    pub(crate) fn kind(&self) -> NodeKind {
        NodeKind::ForEach
    }

    pub(crate) fn insert(&mut self, fact: FactId) -> Result<()> {
        if self.by_fact.contains_key(&fact) {
            return Err(impossible(format!(
                "{:?} already has a {} tuple",
                fact, self.type_name
            )));
        }
        let mut tuple = Tuple::new();
        tuple.push(Element::Fact(fact));
        let slot = self.out.create(tuple, fact);
        self.by_fact.insert(fact, slot);
        Ok(())
    }

    pub(crate) fn update(&mut self, fact: FactId) -> Result<()> {
        let slot = self.slot_of(fact)?;
        self.out.update(slot)
    }

    pub(crate) fn retract(&mut self, fact: FactId) -> Result<()> {
        let slot = self.slot_of(fact)?;
        self.by_fact.remove(&fact);
        self.out.retract(slot)
    }

    fn slot_of(&self, fact: FactId) -> Result<usize> {
        self.by_fact.get(&fact).copied().ok_or_else(|| {
            impossible(format!("{:?} has no {} tuple", fact, self.type_name))
        })
    }

    pub(crate) fn propagate(&mut self, emit: &mut Vec<TupleOp>) -> Result<()> {
        self.out.propagate(emit)
    }

    pub(crate) fn live_tuples(&self) -> usize {
        self.out.active_count()
    }

    pub(crate) fn check_quiescent(&self) -> Result<()> {
        self.out.check_quiescent()?;
        for (fact, &slot) in &self.by_fact {
            if self.out.get(slot)?.payload != *fact {
                return Err(impossible(format!(
                    "{} tuple in slot {} does not belong to {:?}",
                    self.type_name, slot, fact
                )));
            }
        }
        Ok(())
    }
}
