//! Join indexes.
//!
//! One [`Indexer`] holds the live tuples of one side of a join or
//! if-exists node. Equality joiner keys select a hash bucket; the first
//! comparison joiner (if any) orders the bucket so a probe only walks the
//! range that can satisfy the comparison.

mod key;


use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use indexmap::IndexSet;
use smallvec::SmallVec;

use crate::error::{impossible, Result};

pub use key::{EqualKey, RangeKey};

/// Ordering predicate of a comparison joiner, `left <op> right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Comparison {
    /// The same predicate with its operands swapped.
    pub fn flip(self) -> Self {
        match self {
            Comparison::LessThan => Comparison::GreaterThan,
            Comparison::LessThanOrEqual => Comparison::GreaterThanOrEqual,
            Comparison::GreaterThan => Comparison::LessThan,
            Comparison::GreaterThanOrEqual => Comparison::LessThanOrEqual,
        }
    }

    pub fn test<T: Ord + ?Sized>(self, left: &T, right: &T) -> bool {
        match self {
            Comparison::LessThan => left < right,
            Comparison::LessThanOrEqual => left <= right,
            Comparison::GreaterThan => left > right,
            Comparison::GreaterThanOrEqual => left >= right,
        }
    }
}

pub(crate) type EqualKeys = SmallVec<[EqualKey; 2]>;

/// Index position of one tuple: its equality keys plus an optional range key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IndexKey {
    pub(crate) equal: EqualKeys,
    pub(crate) range: Option<RangeKey>,
}

enum Bucket {
    Flat(IndexSet<usize>),
    Sorted(BTreeMap<RangeKey, IndexSet<usize>>),
}

impl Bucket {
    fn is_empty(&self) -> bool {
        match self {
            Bucket::Flat(slots) => slots.is_empty(),
            Bucket::Sorted(ranges) => ranges.is_empty(),
        }
    }
}

/// Indexes tuple handles of one join side.
///
/// `stored` is the comparison that a stored tuple's range key must satisfy
/// against a probe's range key; `None` when the joiner has no comparison.
pub(crate) struct Indexer {
    stored: Option<Comparison>,
    buckets: HashMap<EqualKeys, Bucket>,
    len: usize,
}

impl Indexer {
    pub(crate) fn new(stored: Option<Comparison>) -> Self {
        Self {
            stored,
            buckets: HashMap::new(),
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn put(&mut self, key: &IndexKey, slot: usize) -> Result<()> {
        let sorted = self.stored.is_some();
        let bucket = self.buckets.entry(key.equal.clone()).or_insert_with(|| {
            if sorted {
                Bucket::Sorted(BTreeMap::new())
            } else {
                Bucket::Flat(IndexSet::new())
            }
        });
        let added = match (bucket, &key.range) {
            (Bucket::Flat(slots), None) => slots.insert(slot),
            (Bucket::Sorted(ranges), Some(range)) => {
                ranges.entry(range.clone()).or_default().insert(slot)
            }
            _ => return Err(impossible("index key shape does not match its indexer")),
        };
        if !added {
            return Err(impossible(format!("slot {} indexed twice", slot)));
        }
        self.len += 1;
        Ok(())
    }

    pub(crate) fn remove(&mut self, key: &IndexKey, slot: usize) -> Result<()> {
        let missing = || impossible(format!("slot {} is not indexed under {:?}", slot, key));
        let bucket = self.buckets.get_mut(&key.equal).ok_or_else(missing)?;
        let removed = match (&mut *bucket, &key.range) {
            (Bucket::Flat(slots), None) => slots.shift_remove(&slot),
            (Bucket::Sorted(ranges), Some(range)) => match ranges.get_mut(range) {
                Some(slots) => {
                    let removed = slots.shift_remove(&slot);
                    if slots.is_empty() {
                        ranges.remove(range);
                    }
                    removed
                }
                None => false,
            },
            _ => false,
        };
        if !removed {
            return Err(missing());
        }
        if bucket.is_empty() {
            self.buckets.remove(&key.equal);
        }
        self.len -= 1;
        Ok(())
    }

    /// Handles whose keys match the probe, in insertion order per range key.
    pub(crate) fn matches(&self, probe: &IndexKey) -> SmallVec<[usize; 8]> {
        let mut found = SmallVec::new();
        let Some(bucket) = self.buckets.get(&probe.equal) else {
            return found;
        };
        match (bucket, self.stored, &probe.range) {
            (Bucket::Flat(slots), _, _) => found.extend(slots.iter().copied()),
            (Bucket::Sorted(ranges), Some(op), Some(bound)) => {
                let range = match op {
                    Comparison::LessThan => (Bound::Unbounded, Bound::Excluded(bound)),
                    Comparison::LessThanOrEqual => (Bound::Unbounded, Bound::Included(bound)),
                    Comparison::GreaterThan => (Bound::Excluded(bound), Bound::Unbounded),
                    Comparison::GreaterThanOrEqual => (Bound::Included(bound), Bound::Unbounded),
                };
                for slots in ranges.range::<RangeKey, _>(range).map(|(_, slots)| slots) {
                    found.extend(slots.iter().copied());
                }
            }
            (Bucket::Sorted(_), _, _) => {}
        }
        found
    }
}
