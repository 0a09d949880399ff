use std::marker::PhantomData;
use std::ops::{AddAssign, SubAssign};

use num_traits::ToPrimitive;

use super::{Accumulator, Collector};
use crate::stream::function::TupleFn;
use crate::tuple::TupleView;

/// Sums extracted values; created by [`sum`](super::sum).
///
/// The running sum is exact for integer types, so a retraction restores
/// the previous total bit for bit.
pub struct SumCollector<In, T> {
    mapper: TupleFn<T>,
    _phantom: PhantomData<fn(In)>,
}

impl<In, T> SumCollector<In, T> {
    pub(crate) fn new(mapper: TupleFn<T>) -> Self {
        Self {
            mapper,
            _phantom: PhantomData,
        }
    }
}

impl<In, T> Collector<In> for SumCollector<In, T>
where
    In: 'static,
    T: Default + Copy + AddAssign + SubAssign + PartialEq + std::fmt::Debug + Send + Sync + 'static,
{
    type Value = T;
    type Result = T;
    type Accumulator = SumAccumulator<T>;

    #[inline]
    fn extract(&self, tuple: &TupleView<'_>) -> T {
        (self.mapper)(tuple)
    }

    fn create_accumulator(&self) -> SumAccumulator<T> {
        SumAccumulator { sum: T::default() }
    }
}

pub struct SumAccumulator<T> {
    sum: T,
}

impl<T> Accumulator<T, T> for SumAccumulator<T>
where
    T: Default + Copy + AddAssign + SubAssign + Send,
{
    #[inline]
    fn accumulate(&mut self, value: &T) {
        self.sum += *value;
    }

    #[inline]
    fn retract(&mut self, value: &T) {
        self.sum -= *value;
    }

    #[inline]
    fn finish(&self) -> T {
        self.sum
    }

    fn reset(&mut self) {
        self.sum = T::default();
    }
}

/// Mean of extracted values; created by [`average`](super::average).
pub struct AverageCollector<In, T> {
    mapper: TupleFn<T>,
    _phantom: PhantomData<fn(In)>,
}

impl<In, T> AverageCollector<In, T> {
    pub(crate) fn new(mapper: TupleFn<T>) -> Self {
        Self {
            mapper,
            _phantom: PhantomData,
        }
    }
}

impl<In, T> Collector<In> for AverageCollector<In, T>
where
    In: 'static,
    T: Default + Copy + AddAssign + SubAssign + ToPrimitive + Send + Sync + 'static,
{
    type Value = T;
    type Result = Option<f64>;
    type Accumulator = AverageAccumulator<T>;

    #[inline]
    fn extract(&self, tuple: &TupleView<'_>) -> T {
        (self.mapper)(tuple)
    }

    fn create_accumulator(&self) -> AverageAccumulator<T> {
        AverageAccumulator {
            sum: T::default(),
            count: 0,
        }
    }
}

pub struct AverageAccumulator<T> {
    sum: T,
    count: usize,
}

impl<T> Accumulator<T, Option<f64>> for AverageAccumulator<T>
where
    T: Default + Copy + AddAssign + SubAssign + ToPrimitive + Send,
{
    fn accumulate(&mut self, value: &T) {
        self.sum += *value;
        self.count += 1;
    }

    fn retract(&mut self, value: &T) {
        self.sum -= *value;
        self.count = self.count.saturating_sub(1);
    }

    fn finish(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        self.sum.to_f64().map(|sum| sum / self.count as f64)
    }

    fn reset(&mut self) {
        self.sum = T::default();
        self.count = 0;
    }
}
