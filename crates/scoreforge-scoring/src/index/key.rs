//! Type-erased join keys.
//!
//! Joiner key functions return arbitrary user types. The indexer only
//! needs hashing and equality (equality joiners) or a total order
//! (comparison joiners), so keys are boxed behind small object-safe traits.

use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

trait DynEqualKey: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn DynEqualKey) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<T: Hash + Eq + fmt::Debug + Send + Sync + 'static> DynEqualKey for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynEqualKey) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }
}

/// Hashable key produced by an equality joiner.
#[derive(Clone)]
pub struct EqualKey(Arc<dyn DynEqualKey>);

impl EqualKey {
    pub fn new<T: Hash + Eq + fmt::Debug + Send + Sync + 'static>(key: T) -> Self {
        EqualKey(Arc::new(key))
    }

    fn inner(&self) -> &dyn DynEqualKey {
        &*self.0
    }
}

impl PartialEq for EqualKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner().dyn_eq(other.inner())
    }
}

impl Eq for EqualKey {}

impl Hash for EqualKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner().dyn_hash(state);
    }
}

impl fmt::Debug for EqualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.inner())
    }
}

trait DynRangeKey: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_cmp(&self, other: &dyn DynRangeKey) -> Ordering;
}

impl<T: Ord + fmt::Debug + Send + Sync + 'static> DynRangeKey for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_cmp(&self, other: &dyn DynRangeKey) -> Ordering {
        match other.as_any().downcast_ref::<T>() {
            Some(other) => self.cmp(other),
            // Unreachable through the typed joiner API.
            None => TypeId::of::<T>().cmp(&other.as_any().type_id()),
        }
    }
}

/// Ordered key produced by a comparison joiner.
#[derive(Clone)]
pub struct RangeKey(Arc<dyn DynRangeKey>);

impl RangeKey {
    pub fn new<T: Ord + fmt::Debug + Send + Sync + 'static>(key: T) -> Self {
        RangeKey(Arc::new(key))
    }

    fn inner(&self) -> &dyn DynRangeKey {
        &*self.0
    }
}

impl PartialEq for RangeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RangeKey {}

impl PartialOrd for RangeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RangeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner().dyn_cmp(other.inner())
    }
}

impl fmt::Debug for RangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.inner())
    }
}
