//! Two-element constraint streams.

use std::sync::Arc;

use super::def::{StreamDef, StreamKind};
use super::function::ValuesFn;
use super::joiner::Joiner;
use super::{TriConstraintStream, UniConstraintStream};
use crate::fact::Fact;
use crate::node::JoinPlan;
use crate::tuple::{TupleView, Value};

impl_arity_stream!(BiConstraintStream, 2, A: 0, B: 1);

impl<A: 'static, B: 'static> BiConstraintStream<A, B> {
    /// Extends every pair with each `C` fact the joiner accepts.
    pub fn join<C: Fact>(self, joiner: Joiner<(A, B), C>) -> TriConstraintStream<A, B, C> {
        self.join_stream(UniConstraintStream::from_def(StreamDef::for_each::<C>()), joiner)
    }

    pub fn join_stream<C: 'static>(
        self,
        other: UniConstraintStream<C>,
        joiner: Joiner<(A, B), C>,
    ) -> TriConstraintStream<A, B, C> {
        let plan = Arc::new(JoinPlan::new(&joiner.components));
        TriConstraintStream::from_def(StreamDef::derive(
            StreamKind::Join(plan),
            vec![self.def, other.def],
            3,
        ))
    }

    /// Replaces the second element by every item derived from it.
    pub fn flatten_last<T, I, F>(self, flattener: F) -> BiConstraintStream<A, T>
    where
        T: std::fmt::Debug + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
        F: Fn(&B) -> I + Send + Sync + 'static,
    {
        let flattener: ValuesFn = Arc::new(move |t: &TupleView<'_>| {
            flattener(t.get::<B>(1))
                .into_iter()
                .map(|item| Arc::new(item) as Arc<dyn Value>)
                .collect()
        });
        BiConstraintStream::from_def(StreamDef::derive(
            StreamKind::Flatten(flattener),
            vec![self.def],
            2,
        ))
    }
}
