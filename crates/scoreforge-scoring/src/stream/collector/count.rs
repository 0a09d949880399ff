use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;

use super::{Accumulator, Collector};
use crate::stream::function::TupleFn;
use crate::tuple::TupleView;

/// Counts the tuples of a group, on streams of any arity.
///
/// ```
/// use scoreforge_scoring::stream::collector::{count, Accumulator, Collector};
///
/// let collector = count();
/// let mut acc = <_ as Collector<(u8,)>>::create_accumulator(&collector);
/// acc.accumulate(&());
/// acc.accumulate(&());
/// acc.retract(&());
/// assert_eq!(acc.finish(), 1);
/// ```
pub fn count() -> CountCollector {
    CountCollector
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CountCollector;

impl<In> Collector<In> for CountCollector {
    type Value = ();
    type Result = usize;
    type Accumulator = CountAccumulator;

    #[inline]
    fn extract(&self, _tuple: &TupleView<'_>) {}

    fn create_accumulator(&self) -> CountAccumulator {
        CountAccumulator { count: 0 }
    }
}

pub struct CountAccumulator {
    count: usize,
}

impl CountAccumulator {
    #[inline]
    pub fn get(&self) -> usize {
        self.count
    }
}

impl Accumulator<(), usize> for CountAccumulator {
    #[inline]
    fn accumulate(&mut self, _: &()) {
        self.count += 1;
    }

    #[inline]
    fn retract(&mut self, _: &()) {
        self.count = self.count.saturating_sub(1);
    }

    #[inline]
    fn finish(&self) -> usize {
        self.count
    }

    #[inline]
    fn reset(&mut self) {
        self.count = 0;
    }
}

/// Counts distinct keys; created by [`count_distinct`](super::count_distinct).
pub struct CountDistinctCollector<In, K> {
    key: TupleFn<K>,
    _phantom: PhantomData<fn(In)>,
}

impl<In, K> CountDistinctCollector<In, K> {
    pub(crate) fn new(key: TupleFn<K>) -> Self {
        Self {
            key,
            _phantom: PhantomData,
        }
    }
}

impl<In, K> Collector<In> for CountDistinctCollector<In, K>
where
    In: 'static,
    K: Hash + Eq + Clone + Send + Sync + 'static,
{
    type Value = K;
    type Result = usize;
    type Accumulator = CountDistinctAccumulator<K>;

    fn extract(&self, tuple: &TupleView<'_>) -> K {
        (self.key)(tuple)
    }

    fn create_accumulator(&self) -> CountDistinctAccumulator<K> {
        CountDistinctAccumulator {
            counts: HashMap::new(),
        }
    }
}

pub struct CountDistinctAccumulator<K> {
    counts: HashMap<K, usize>,
}

impl<K> Accumulator<K, usize> for CountDistinctAccumulator<K>
where
    K: Hash + Eq + Clone + Send + Sync,
{
    fn accumulate(&mut self, value: &K) {
        match self.counts.get_mut(value) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(value.clone(), 1);
            }
        }
    }

    fn retract(&mut self, value: &K) {
        if let Some(count) = self.counts.get_mut(value) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(value);
            }
        }
    }

    fn finish(&self) -> usize {
        self.counts.len()
    }

    fn reset(&mut self) {
        self.counts.clear();
    }
}
