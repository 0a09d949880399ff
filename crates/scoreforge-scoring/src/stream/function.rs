//! Type-erased closures stored in stream definitions.
//!
//! The typed stream API wraps each user closure so it reads its arguments
//! out of a [`TupleView`]; the network only ever calls these erased forms.

use std::sync::Arc;

use crate::index::{EqualKey, RangeKey};
use crate::tuple::{TupleView, Value};

pub(crate) type TupleFn<T> = Arc<dyn Fn(&TupleView<'_>) -> T + Send + Sync>;

pub(crate) type Predicate = TupleFn<bool>;

pub(crate) type PairPredicate = Arc<dyn Fn(&TupleView<'_>, &TupleView<'_>) -> bool + Send + Sync>;

pub(crate) type ValueFn = TupleFn<Arc<dyn Value>>;

pub(crate) type ValuesFn = TupleFn<Vec<Arc<dyn Value>>>;

/// One erased component of a joiner.
#[derive(Clone)]
pub(crate) enum JoinerComponent {
    Equal {
        left: TupleFn<EqualKey>,
        right: TupleFn<EqualKey>,
    },
    Compare {
        op: crate::index::Comparison,
        left: TupleFn<RangeKey>,
        right: TupleFn<RangeKey>,
    },
    Filter(PairPredicate),
}
