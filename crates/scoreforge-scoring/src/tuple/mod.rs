//! Tuples flowing through the constraint network.
//!
//! A tuple is an ordered, fixed-arity list of [`Element`]s: references to
//! working facts, or derived values produced by group-by, `map` and
//! `flatten_last`. Each node owns the tuples it creates in an
//! [`Outbound`] arena; downstream nodes only keep copies of the element
//! list keyed by the producer's slot handle.

mod outbound;
mod store;


use std::any::Any;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::fact::{FactId, Facts};

pub(crate) use outbound::Outbound;
pub(crate) use store::InputStore;

/// A derived value carried by a tuple.
pub trait Value: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + Send + Sync> Value for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// One position of a tuple.
#[derive(Clone)]
pub enum Element {
    /// A working fact, resolved through the store on access.
    Fact(FactId),
    /// A value computed inside the network.
    Value(Arc<dyn Value>),
}

impl Element {
    pub(crate) fn value<T: Value>(value: T) -> Self {
        Element::Value(Arc::new(value))
    }

    pub fn fact_id(&self) -> Option<FactId> {
        match self {
            Element::Fact(id) => Some(*id),
            Element::Value(_) => None,
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Fact(id) => write!(f, "{:?}", id),
            Element::Value(value) => {
                let value: &dyn Value = &**value;
                write!(f, "{:?}", value)
            }
        }
    }
}

pub(crate) type Tuple = SmallVec<[Element; 4]>;

pub(crate) fn concat(left: &[Element], right: &[Element]) -> Tuple {
    let mut tuple = Tuple::with_capacity(left.len() + right.len());
    tuple.extend(left.iter().cloned());
    tuple.extend(right.iter().cloned());
    tuple
}

/// Lifecycle of a tuple inside the node that owns it.
///
/// `Creating -> Ok -> Updating -> Ok ... -> Dying -> Dead`. A tuple
/// retracted while still `Creating` becomes `Aborting` and is discarded
/// without ever reaching downstream nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TupleState {
    Creating,
    Ok,
    Updating,
    Dying,
    Aborting,
    Dead,
}

impl TupleState {
    /// True while the tuple waits in its node's dirty queue.
    pub fn is_dirty(self) -> bool {
        !matches!(self, TupleState::Ok | TupleState::Dead)
    }

    /// True if downstream nodes currently hold (or are about to hold) it.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            TupleState::Creating | TupleState::Ok | TupleState::Updating
        )
    }
}

/// Typed, read-only access to a tuple's elements.
///
/// Constraint closures never see a `TupleView`; the stream API unpacks it
/// into `&A, &B, ...` before calling them.
#[derive(Clone, Copy)]
pub struct TupleView<'a> {
    facts: &'a Facts,
    elements: &'a [Element],
}

impl<'a> TupleView<'a> {
    pub(crate) fn new(facts: &'a Facts, elements: &'a [Element]) -> Self {
        Self { facts, elements }
    }

    pub fn arity(&self) -> usize {
        self.elements.len()
    }

    pub fn elements(&self) -> &'a [Element] {
        self.elements
    }

    pub fn fact_id(&self, index: usize) -> Option<FactId> {
        self.elements.get(index).and_then(Element::fact_id)
    }

    /// Returns the element at `index` as a `T`.
    ///
    /// # Panics
    /// Panics if the element is not a `T` or its fact is no longer stored.
    /// The typed stream API makes both impossible.
    pub fn get<T: 'static>(&self, index: usize) -> &'a T {
        let elements: &'a [Element] = self.elements;
        let resolved = match &elements[index] {
            Element::Fact(id) => self.facts.get_any(*id),
            Element::Value(value) => {
                let value: &'a dyn Value = &**value;
                Some(value.as_any())
            }
        };
        match resolved.and_then(|any| any.downcast_ref::<T>()) {
            Some(value) => value,
            None => panic!(
                "Impossible state: tuple element {} is not a live {}",
                index,
                std::any::type_name::<T>()
            ),
        }
    }
}

impl fmt::Debug for TupleView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.elements.iter()).finish()
    }
}
