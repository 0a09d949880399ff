use std::fmt::Debug;
use std::marker::PhantomData;

use super::{Accumulator, Collector};
use crate::stream::function::TupleFn;
use crate::tuple::TupleView;

/// Collects extracted values; created by [`to_list`](super::to_list).
pub struct ToListCollector<In, T> {
    mapper: TupleFn<T>,
    _phantom: PhantomData<fn(In)>,
}

impl<In, T> ToListCollector<In, T> {
    pub(crate) fn new(mapper: TupleFn<T>) -> Self {
        Self {
            mapper,
            _phantom: PhantomData,
        }
    }
}

impl<In, T> Collector<In> for ToListCollector<In, T>
where
    In: 'static,
    T: Clone + PartialEq + Debug + Send + Sync + 'static,
{
    type Value = T;
    type Result = Vec<T>;
    type Accumulator = ToListAccumulator<T>;

    fn extract(&self, tuple: &TupleView<'_>) -> T {
        (self.mapper)(tuple)
    }

    fn create_accumulator(&self) -> ToListAccumulator<T> {
        ToListAccumulator { items: Vec::new() }
    }
}

pub struct ToListAccumulator<T> {
    items: Vec<T>,
}

impl<T> Accumulator<T, Vec<T>> for ToListAccumulator<T>
where
    T: Clone + PartialEq + Send,
{
    fn accumulate(&mut self, value: &T) {
        self.items.push(value.clone());
    }

    fn retract(&mut self, value: &T) {
        if let Some(position) = self.items.iter().position(|item| item == value) {
            self.items.remove(position);
        }
    }

    fn finish(&self) -> Vec<T> {
        self.items.clone()
    }

    fn reset(&mut self) {
        self.items.clear();
    }
}
