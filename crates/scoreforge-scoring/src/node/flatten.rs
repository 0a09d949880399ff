use smallvec::SmallVec;

use super::{Node, NodeKind, Port, TupleOp};
use crate::error::Result;
use crate::fact::Facts;
use crate::stream::function::ValuesFn;
use crate::tuple::{Element, InputStore, Outbound, Tuple, TupleView};

/// Expands the last element of each upstream tuple into one tuple per item.
///
/// On update the item list is matched positionally against the previous
/// expansion: surviving positions are updated in place, the surplus is
/// retracted or created.
pub(crate) struct FlattenLastNode {
    flattener: ValuesFn,
    outputs: InputStore<SmallVec<[usize; 4]>>,
    out: Outbound<()>,
}

impl FlattenLastNode {
    pub(crate) fn new(flattener: ValuesFn) -> Self {
        Self {
            flattener,
            outputs: InputStore::new(),
            out: Outbound::new(),
        }
    }

    fn expand(&self, tuple: &Tuple, facts: &Facts) -> Vec<Tuple> {
        let prefix = &tuple[..tuple.len().saturating_sub(1)];
        (self.flattener)(&TupleView::new(facts, tuple))
            .into_iter()
            .map(|item| {
                let mut expanded: Tuple = prefix.iter().cloned().collect();
                expanded.push(Element::Value(item));
                expanded
            })
            .collect()
    }
}

impl Node for FlattenLastNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Flatten
    }

    fn insert(&mut self, _port: Port, slot: usize, tuple: Tuple, facts: &Facts) -> Result<()> {
        let outs = self
            .expand(&tuple, facts)
            .into_iter()
            .map(|expanded| self.out.create(expanded, ()))
            .collect();
        self.outputs.insert(slot, outs)
    }

    fn update(&mut self, _port: Port, slot: usize, tuple: Tuple, facts: &Facts) -> Result<()> {
        let mut items = self.expand(&tuple, facts).into_iter();
        let outs = self.outputs.get_mut(slot)?;
        let mut kept = 0;
        for &out in outs.iter() {
            match items.next() {
                Some(expanded) => {
                    self.out.update_elements(out, expanded)?;
                    kept += 1;
                }
                None => self.out.retract(out)?,
            }
        }
        outs.truncate(kept);
        for expanded in items {
            outs.push(self.out.create(expanded, ()));
        }
        Ok(())
    }

    fn retract(&mut self, _port: Port, slot: usize) -> Result<()> {
        for out in self.outputs.remove(slot)? {
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
        self.out.check_quiescent()
    }
}
