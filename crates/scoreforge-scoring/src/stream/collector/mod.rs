//! Collectors for grouping and aggregating tuples.
//!
//! A [`Collector`] extracts one value per tuple and folds it into an
//! [`Accumulator`]. Accumulators support retraction, so a group-by node
//! keeps its aggregates up to date without rescanning the group.
//!
//! The top-level constructors read uni-stream elements; [`bi`] holds the
//! same constructors for bi-streams.

mod count;
mod extremum;
mod list;
mod sum;

#[cfg(test)]
mod tests;

use std::fmt::Debug;

use crate::tuple::TupleView;

pub use count::{count, CountAccumulator, CountCollector, CountDistinctAccumulator, CountDistinctCollector};
pub use extremum::{ExtremumAccumulator, MaxCollector, MinCollector};
pub use list::{ToListAccumulator, ToListCollector};
pub use sum::{AverageAccumulator, AverageCollector, SumAccumulator, SumCollector};

/// Incrementally maintained aggregate of extracted values.
pub trait Accumulator<V, R>: Send {
    fn accumulate(&mut self, value: &V);

    /// Removes a value previously passed to [`Accumulator::accumulate`].
    fn retract(&mut self, value: &V);

    fn finish(&self) -> R;

    fn reset(&mut self);
}

/// Aggregation over tuples whose elements are `In`, e.g. `(Shift,)`.
pub trait Collector<In>: Send + Sync + 'static {
    /// Per-tuple value handed to the accumulator.
    type Value: Send + Sync + 'static;
    /// Aggregate emitted downstream.
    type Result: Clone + PartialEq + Debug + Send + Sync + 'static;
    type Accumulator: Accumulator<Self::Value, Self::Result> + 'static;

    fn extract(&self, tuple: &TupleView<'_>) -> Self::Value;

    fn create_accumulator(&self) -> Self::Accumulator;
}

macro_rules! collector_functions {
    ($($t:ident : $i:tt),+) => {
        use std::fmt::Debug;
        use std::hash::Hash;
        use std::ops::{AddAssign, SubAssign};
        use std::sync::Arc;

        use num_traits::ToPrimitive;

        use super::{
            AverageCollector, CountDistinctCollector, MaxCollector, MinCollector, SumCollector,
            ToListCollector,
        };
        use crate::tuple::TupleView;

        #[allow(unused_imports)]
        pub use super::count::count;

        /// Counts the distinct keys in a group.
        pub fn count_distinct<$($t,)+ K, F>(key: F) -> CountDistinctCollector<($($t,)+), K>
        where
            $($t: 'static,)+
            K: Hash + Eq + Clone + Send + Sync + 'static,
            F: Fn($(&$t),+) -> K + Send + Sync + 'static,
        {
            CountDistinctCollector::new(Arc::new(move |t: &TupleView<'_>| key($(t.get::<$t>($i)),+)))
        }

        /// Sums a value over a group.
        pub fn sum<$($t,)+ T, F>(mapper: F) -> SumCollector<($($t,)+), T>
        where
            $($t: 'static,)+
            T: Default + Copy + AddAssign + SubAssign + PartialEq + Debug + Send + Sync + 'static,
            F: Fn($(&$t),+) -> T + Send + Sync + 'static,
        {
            SumCollector::new(Arc::new(move |t: &TupleView<'_>| mapper($(t.get::<$t>($i)),+)))
        }

        /// Arithmetic mean of a value over a group, `None` when empty.
        pub fn average<$($t,)+ T, F>(mapper: F) -> AverageCollector<($($t,)+), T>
        where
            $($t: 'static,)+
            T: Default + Copy + AddAssign + SubAssign + ToPrimitive + Send + Sync + 'static,
            F: Fn($(&$t),+) -> T + Send + Sync + 'static,
        {
            AverageCollector::new(Arc::new(move |t: &TupleView<'_>| mapper($(t.get::<$t>($i)),+)))
        }

        /// Smallest value in a group.
        pub fn min<$($t,)+ T, F>(mapper: F) -> MinCollector<($($t,)+), T>
        where
            $($t: 'static,)+
            T: Ord + Clone + Debug + Send + Sync + 'static,
            F: Fn($(&$t),+) -> T + Send + Sync + 'static,
        {
            MinCollector::new(Arc::new(move |t: &TupleView<'_>| mapper($(t.get::<$t>($i)),+)))
        }

        /// Largest value in a group.
        pub fn max<$($t,)+ T, F>(mapper: F) -> MaxCollector<($($t,)+), T>
        where
            $($t: 'static,)+
            T: Ord + Clone + Debug + Send + Sync + 'static,
            F: Fn($(&$t),+) -> T + Send + Sync + 'static,
        {
            MaxCollector::new(Arc::new(move |t: &TupleView<'_>| mapper($(t.get::<$t>($i)),+)))
        }

        /// Collects a value per tuple, in insertion order.
        pub fn to_list<$($t,)+ T, F>(mapper: F) -> ToListCollector<($($t,)+), T>
        where
            $($t: 'static,)+
            T: Clone + PartialEq + Debug + Send + Sync + 'static,
            F: Fn($(&$t),+) -> T + Send + Sync + 'static,
        {
            ToListCollector::new(Arc::new(move |t: &TupleView<'_>| mapper($(t.get::<$t>($i)),+)))
        }
    };
}

mod uni {
    collector_functions!(A: 0);
}

pub use uni::{average, count_distinct, max, min, sum, to_list};

/// Collectors over bi-stream tuples.
pub mod bi {
    collector_functions!(A: 0, B: 1);
}
