//! Three-element constraint streams.

use std::sync::Arc;

use super::def::{StreamDef, StreamKind};
use super::joiner::Joiner;
use super::{QuadConstraintStream, UniConstraintStream};
use crate::fact::Fact;
use crate::node::JoinPlan;

impl_arity_stream!(TriConstraintStream, 3, A: 0, B: 1, C: 2);

impl<A: 'static, B: 'static, C: 'static> TriConstraintStream<A, B, C> {
    pub fn join<D: Fact>(self, joiner: Joiner<(A, B, C), D>) -> QuadConstraintStream<A, B, C, D> {
        self.join_stream(UniConstraintStream::from_def(StreamDef::for_each::<D>()), joiner)
    }

    pub fn join_stream<D: 'static>(
        self,
        other: UniConstraintStream<D>,
        joiner: Joiner<(A, B, C), D>,
    ) -> QuadConstraintStream<A, B, C, D> {
        let plan = Arc::new(JoinPlan::new(&joiner.components));
        QuadConstraintStream::from_def(StreamDef::derive(
            StreamKind::Join(plan),
            vec![self.def, other.def],
            4,
        ))
    }
}
