//! Entry points of the constraint stream API.

use scoreforge_core::Score;

use super::constraint::Constraint;
use super::def::StreamDef;
use super::function::JoinerComponent;
use super::joiner::Joiner;
use super::{BiConstraintStream, UniConstraintStream};
use crate::fact::Fact;
use crate::tuple::TupleView;

/// Starts constraint streams.
///
/// ```
/// use scoreforge_core::SimpleScore;
/// use scoreforge_scoring::stream::joiner::equal;
/// use scoreforge_scoring::stream::ConstraintFactory;
///
/// #[derive(Clone, Debug)]
/// struct Queen { row: Option<i64> }
///
/// let factory = ConstraintFactory::new();
/// let conflict = factory
///     .for_each_unique_pair(equal(|q: &Queen| q.row))
///     .filter(|a: &Queen, _: &Queen| a.row.is_some())
///     .penalize(SimpleScore::of(1))
///     .as_constraint("Row conflict");
/// assert_eq!(conflict.name(), "Row conflict");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintFactory;

impl ConstraintFactory {
    pub fn new() -> Self {
        ConstraintFactory
    }

    /// Every live fact of type `A`.
    pub fn for_each<A: Fact>(&self) -> UniConstraintStream<A> {
        UniConstraintStream::from_def(StreamDef::for_each::<A>())
    }

    /// Every unordered pair of distinct `A` facts accepted by the joiner,
    /// once, with the lower [`FactId`](crate::fact::FactId) on the left.
    pub fn for_each_unique_pair<A: Fact>(&self, joiner: Joiner<(A,), A>) -> BiConstraintStream<A, A> {
        let ordered = Joiner::from_component(JoinerComponent::Filter(std::sync::Arc::new(
            |left: &TupleView<'_>, right: &TupleView<'_>| left.fact_id(0) < right.fact_id(0),
        )));
        self.for_each::<A>().join(joiner.and(ordered))
    }
}

/// Supplies the constraints of one problem.
pub trait ConstraintProvider<Sc: Score> {
    fn define_constraints(&self, factory: &ConstraintFactory) -> Vec<Constraint<Sc>>;
}

impl<Sc, F> ConstraintProvider<Sc> for F
where
    Sc: Score,
    F: Fn(&ConstraintFactory) -> Vec<Constraint<Sc>>,
{
    fn define_constraints(&self, factory: &ConstraintFactory) -> Vec<Constraint<Sc>> {
        self(factory)
    }
}
