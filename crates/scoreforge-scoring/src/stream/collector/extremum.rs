use std::collections::BTreeMap;
use std::fmt::Debug;
use std::marker::PhantomData;

use super::{Accumulator, Collector};
use crate::stream::function::TupleFn;
use crate::tuple::TupleView;

/// Smallest extracted value; created by [`min`](super::min).
pub struct MinCollector<In, T> {
    mapper: TupleFn<T>,
    _phantom: PhantomData<fn(In)>,
}

/// Largest extracted value; created by [`max`](super::max).
pub struct MaxCollector<In, T> {
    mapper: TupleFn<T>,
    _phantom: PhantomData<fn(In)>,
}

impl<In, T> MinCollector<In, T> {
    pub(crate) fn new(mapper: TupleFn<T>) -> Self {
        Self {
            mapper,
            _phantom: PhantomData,
        }
    }
}

impl<In, T> MaxCollector<In, T> {
    pub(crate) fn new(mapper: TupleFn<T>) -> Self {
        Self {
            mapper,
            _phantom: PhantomData,
        }
    }
}

impl<In, T> Collector<In> for MinCollector<In, T>
where
    In: 'static,
    T: Ord + Clone + Debug + Send + Sync + 'static,
{
    type Value = T;
    type Result = Option<T>;
    type Accumulator = ExtremumAccumulator<T>;

    fn extract(&self, tuple: &TupleView<'_>) -> T {
        (self.mapper)(tuple)
    }

    fn create_accumulator(&self) -> ExtremumAccumulator<T> {
        ExtremumAccumulator::new(false)
    }
}

impl<In, T> Collector<In> for MaxCollector<In, T>
where
    In: 'static,
    T: Ord + Clone + Debug + Send + Sync + 'static,
{
    type Value = T;
    type Result = Option<T>;
    type Accumulator = ExtremumAccumulator<T>;

    fn extract(&self, tuple: &TupleView<'_>) -> T {
        (self.mapper)(tuple)
    }

    fn create_accumulator(&self) -> ExtremumAccumulator<T> {
        ExtremumAccumulator::new(true)
    }
}

/// Multiset of values, so retracting the current extreme falls back to
/// the next one.
pub struct ExtremumAccumulator<T> {
    values: BTreeMap<T, usize>,
    largest: bool,
}

impl<T> ExtremumAccumulator<T> {
    fn new(largest: bool) -> Self {
        Self {
            values: BTreeMap::new(),
            largest,
        }
    }
}

impl<T> Accumulator<T, Option<T>> for ExtremumAccumulator<T>
where
    T: Ord + Clone + Send,
{
    fn accumulate(&mut self, value: &T) {
        *self.values.entry(value.clone()).or_insert(0) += 1;
    }

    fn retract(&mut self, value: &T) {
        if let Some(count) = self.values.get_mut(value) {
            *count -= 1;
            if *count == 0 {
                self.values.remove(value);
            }
        }
    }

    fn finish(&self) -> Option<T> {
        let entry = if self.largest {
            self.values.last_key_value()
        } else {
            self.values.first_key_value()
        };
        entry.map(|(value, _)| value.clone())
    }

    fn reset(&mut self) {
        self.values.clear();
    }
}
