use super::{Node, NodeKind, Port, TupleOp};
use crate::error::Result;
use crate::fact::Facts;
use crate::stream::function::ValueFn;
use crate::tuple::{Element, InputStore, Outbound, Tuple, TupleView};

/// Replaces each upstream tuple by a uni-tuple of a computed value.
pub(crate) struct MapNode {
    mapper: ValueFn,
    outputs: InputStore<usize>,
    out: Outbound<()>,
}

impl MapNode {
    pub(crate) fn new(mapper: ValueFn) -> Self {
        Self {
            mapper,
            outputs: InputStore::new(),
            out: Outbound::new(),
        }
    }

    fn map(&self, tuple: &Tuple, facts: &Facts) -> Tuple {
        let mut mapped = Tuple::new();
        mapped.push(Element::Value((self.mapper)(&TupleView::new(facts, tuple))));
        mapped
    }
}

impl Node for MapNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Map
    }

    fn insert(&mut self, _port: Port, slot: usize, tuple: Tuple, facts: &Facts) -> Result<()> {
        let out = self.out.create(self.map(&tuple, facts), ());
        self.outputs.insert(slot, out)
    }

    fn update(&mut self, _port: Port, slot: usize, tuple: Tuple, facts: &Facts) -> Result<()> {
        let mapped = self.map(&tuple, facts);
        let out = *self.outputs.get(slot)?;
        self.out.update_elements(out, mapped)
    }

    fn retract(&mut self, _port: Port, slot: usize) -> Result<()> {
        let out = self.outputs.remove(slot)?;
        self.out.retract(out)
    }

    fn propagate(&mut self, emit: &mut Vec<TupleOp>) -> Result<()> {
        self.out.propagate(emit)
    }

    fn live_tuples(&self) -> usize {
        self.out.active_count()
    }

    fn check_quiescent(&self) -> Result<()> {
        self.out.check_quiescent()
    }
}
