//! Stream nodes.
//!
//! Every node kind implements [`Node`]: it applies the signals its
//! upstream nodes produced during a flush, then hands its own coalesced
//! changes to the session for delivery downstream. For-each nodes are fed
//! by fact operations instead and live in [`ForEachNode`]; terminal nodes
//! accumulate score and live in [`Scorer`].

mod exists;
mod filter;
mod flatten;
mod for_each;
mod group;
mod join;
mod map;
mod scorer;

#[cfg(test)]
mod tests;

use crate::error::Result;
use crate::fact::Facts;
use crate::tuple::Tuple;

pub(crate) use exists::ExistsNode;
pub(crate) use filter::FilterNode;
pub(crate) use flatten::FlattenLastNode;
pub(crate) use for_each::ForEachNode;
pub(crate) use group::{GroupOutput, GroupSpec, Grouping};
pub(crate) use join::{JoinNode, JoinPlan};
pub(crate) use map::MapNode;
pub(crate) use scorer::{Impact, Scorer};

/// A change to one tuple, addressed by the producer's slot handle.
#[derive(Debug, Clone)]
pub(crate) enum TupleOp {
    Insert { slot: usize, tuple: Tuple },
    Update { slot: usize, tuple: Tuple },
    Retract { slot: usize },
}

impl TupleOp {
    /// Retractions are applied before anything else within a flush.
    pub(crate) fn phase(&self) -> u8 {
        match self {
            TupleOp::Retract { .. } => 0,
            TupleOp::Update { .. } => 1,
            TupleOp::Insert { .. } => 2,
        }
    }
}

/// Input side of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Port {
    Left,
    Right,
}

/// A [`TupleOp`] delivered to one port.
#[derive(Debug, Clone)]
pub(crate) struct Signal {
    pub(crate) port: Port,
    pub(crate) op: TupleOp,
}

/// Where a node's output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Target {
    Node { index: usize, port: Port },
    Scorer(usize),
}

/// Node kind.
///
/// The ordering is only used to sort diagnostics; propagation follows each
/// node's layer in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    ForEach,
    Filter,
    Map,
    Flatten,
    Join,
    IfExists,
    GroupBy,
    Scorer,
}

pub(crate) trait Node: Send {
    fn kind(&self) -> NodeKind;

    fn insert(&mut self, port: Port, slot: usize, tuple: Tuple, facts: &Facts) -> Result<()>;

    fn update(&mut self, port: Port, slot: usize, tuple: Tuple, facts: &Facts) -> Result<()>;

    fn retract(&mut self, port: Port, slot: usize) -> Result<()>;

    /// Runs once after the whole inbox of a flush has been applied.
    fn settle(&mut self) -> Result<()> {
        Ok(())
    }

    fn propagate(&mut self, emit: &mut Vec<TupleOp>) -> Result<()>;

    /// Output tuples currently visible downstream.
    fn live_tuples(&self) -> usize;

    fn check_quiescent(&self) -> Result<()>;
}

/// Applies a flush's inbox to a node, retractions first.
pub(crate) fn apply_inbox(
    node: &mut dyn Node,
    mut inbox: Vec<Signal>,
    facts: &Facts,
) -> Result<()> {
    inbox.sort_by_key(|signal| signal.op.phase());
    for Signal { port, op } in inbox {
        match op {
            TupleOp::Insert { slot, tuple } => node.insert(port, slot, tuple, facts)?,
            TupleOp::Update { slot, tuple } => node.update(port, slot, tuple, facts)?,
            TupleOp::Retract { slot } => node.retract(port, slot)?,
        }
    }
    node.settle()
}
