//! Single-element constraint streams.

use std::sync::Arc;

use super::def::{StreamDef, StreamKind};
use super::function::ValuesFn;
use super::joiner::Joiner;
use super::BiConstraintStream;
use crate::fact::Fact;
use crate::node::JoinPlan;
use crate::tuple::{TupleView, Value};

impl_arity_stream!(UniConstraintStream, 1, A: 0);

impl<A: 'static> UniConstraintStream<A> {
    /// Pairs every element with every `B` fact the joiner accepts.
    ///
    /// The join never drops pairs of a fact with itself; self-joins that
    /// need distinct facts use
    /// [`for_each_unique_pair`](super::ConstraintFactory::for_each_unique_pair)
    /// or an explicit filter.
    pub fn join<B: Fact>(self, joiner: Joiner<(A,), B>) -> BiConstraintStream<A, B> {
        self.join_stream(UniConstraintStream::from_def(StreamDef::for_each::<B>()), joiner)
    }

    /// Joins against an already derived stream of `B`.
    pub fn join_stream<B: 'static>(
        self,
        other: UniConstraintStream<B>,
        joiner: Joiner<(A,), B>,
    ) -> BiConstraintStream<A, B> {
        let plan = Arc::new(JoinPlan::new(&joiner.components));
        BiConstraintStream::from_def(StreamDef::derive(
            StreamKind::Join(plan),
            vec![self.def, other.def],
            2,
        ))
    }

    /// Replaces each element by every item of a derived collection.
    pub fn flatten_last<T, I, F>(self, flattener: F) -> UniConstraintStream<T>
    where
        T: std::fmt::Debug + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
        F: Fn(&A) -> I + Send + Sync + 'static,
    {
        let flattener: ValuesFn = Arc::new(move |t: &TupleView<'_>| {
            flattener(t.get::<A>(0))
                .into_iter()
                .map(|item| Arc::new(item) as Arc<dyn Value>)
                .collect()
        });
        UniConstraintStream::from_def(StreamDef::derive(
            StreamKind::Flatten(flattener),
            vec![self.def],
            1,
        ))
    }
}
