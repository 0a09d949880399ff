//! Untyped stream definitions.
//!
//! Every typed stream handle wraps an `Arc<StreamDef>`; the network
//! builder walks these definitions to lay out nodes. Two handles cloned
//! from the same definition share one node.

use std::any::TypeId;
use std::sync::Arc;

use crate::fact::{short_type_name, Fact};
use crate::node::{
    ExistsNode, FilterNode, FlattenLastNode, GroupSpec, JoinNode, JoinPlan, MapNode, Node,
    NodeKind,
};

use super::function::{Predicate, ValueFn, ValuesFn};

pub(crate) enum StreamKind {
    ForEach {
        type_id: TypeId,
        type_name: &'static str,
    },
    Filter(Predicate),
    Join(Arc<JoinPlan>),
    Exists {
        plan: Arc<JoinPlan>,
        should_exist: bool,
    },
    Group(Arc<dyn GroupSpec>),
    Map(ValueFn),
    Flatten(ValuesFn),
}

pub(crate) struct StreamDef {
    pub(crate) kind: StreamKind,
    /// Left parent first; joins and if-exists also have a right parent.
    pub(crate) parents: Vec<Arc<StreamDef>>,
    pub(crate) arity: usize,
}

impl StreamDef {
    pub(crate) fn for_each<A: Fact>() -> Arc<Self> {
        Arc::new(StreamDef {
            kind: StreamKind::ForEach {
                type_id: TypeId::of::<A>(),
                type_name: short_type_name(std::any::type_name::<A>()),
            },
            parents: Vec::new(),
            arity: 1,
        })
    }

    pub(crate) fn derive(kind: StreamKind, parents: Vec<Arc<StreamDef>>, arity: usize) -> Arc<Self> {
        Arc::new(StreamDef {
            kind,
            parents,
            arity,
        })
    }

    pub(crate) fn node_kind(&self) -> NodeKind {
        match &self.kind {
            StreamKind::ForEach { .. } => NodeKind::ForEach,
            StreamKind::Filter(_) => NodeKind::Filter,
            StreamKind::Join(_) => NodeKind::Join,
            StreamKind::Exists { .. } => NodeKind::IfExists,
            StreamKind::Group(_) => NodeKind::GroupBy,
            StreamKind::Map(_) => NodeKind::Map,
            StreamKind::Flatten(_) => NodeKind::Flatten,
        }
    }

    /// Builds a fresh node; `None` for for-each sources.
    pub(crate) fn instantiate(&self) -> Option<Box<dyn Node>> {
        let node: Box<dyn Node> = match &self.kind {
            StreamKind::ForEach { .. } => return None,
            StreamKind::Filter(predicate) => Box::new(FilterNode::new(predicate.clone())),
            StreamKind::Join(plan) => Box::new(JoinNode::new(plan.clone())),
            StreamKind::Exists { plan, should_exist } => {
                Box::new(ExistsNode::new(plan.clone(), *should_exist))
            }
            StreamKind::Group(spec) => spec.instantiate(),
            StreamKind::Map(mapper) => Box::new(MapNode::new(mapper.clone())),
            StreamKind::Flatten(flattener) => Box::new(FlattenLastNode::new(flattener.clone())),
        };
        Some(node)
    }
}
