//! Joiners for constraint stream joins and if-exists gates.
//!
//! A joiner is a conjunction of components. Equality components select a
//! hash bucket, the first comparison orders that bucket, and everything
//! else is checked per candidate pair.
//!
//! ```
//! use scoreforge_scoring::stream::joiner::{equal, less_than};
//!
//! #[derive(Clone, Debug)]
//! struct Shift { employee: usize, start: i64, end: i64 }
//!
//! let same_employee_earlier = equal(|s: &Shift| s.employee)
//!     .and(less_than(|s: &Shift| s.start, |o: &Shift| o.start));
//! assert_eq!(same_employee_earlier.len(), 2);
//! ```
//!
//! Streams of arity two and three join through [`bi`] and [`tri`], whose
//! left-hand functions take two or three arguments.

#[cfg(test)]
mod tests;

use std::marker::PhantomData;

use crate::stream::function::JoinerComponent;

/// Matching condition between a left stream with element tuple `L` and a
/// right uni-stream of `R`.
pub struct Joiner<L, R> {
    pub(crate) components: Vec<JoinerComponent>,
    _phantom: PhantomData<fn(L, R)>,
}

impl<L, R> Joiner<L, R> {
    pub(crate) fn from_component(component: JoinerComponent) -> Self {
        Self {
            components: vec![component],
            _phantom: PhantomData,
        }
    }

    /// Both joiners must match.
    pub fn and(mut self, other: Joiner<L, R>) -> Self {
        self.components.extend(other.components);
        self
    }

    /// Number of components in the conjunction.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Matches every pair: a full cross join.
pub fn cross<L, R>() -> Joiner<L, R> {
    Joiner {
        components: Vec::new(),
        _phantom: PhantomData,
    }
}

macro_rules! joiner_functions {
    ($equal:ident; $($t:ident : $i:tt),+) => {
        use std::fmt::Debug;
        use std::hash::Hash;
        use std::sync::Arc;

        use crate::index::{Comparison, EqualKey, RangeKey};
        use crate::stream::function::JoinerComponent;
        use crate::tuple::TupleView;

        #[allow(unused_imports)]
        pub use super::{cross, Joiner};

        /// Matches when both key functions return equal keys.
        pub fn $equal<$($t,)+ R, K, Fl, Fr>(left: Fl, right: Fr) -> Joiner<($($t,)+), R>
        where
            $($t: 'static,)+
            R: 'static,
            K: Hash + Eq + Debug + Send + Sync + 'static,
            Fl: Fn($(&$t),+) -> K + Send + Sync + 'static,
            Fr: Fn(&R) -> K + Send + Sync + 'static,
        {
            Joiner::from_component(JoinerComponent::Equal {
                left: Arc::new(move |t: &TupleView<'_>| EqualKey::new(left($(t.get::<$t>($i)),+))),
                right: Arc::new(move |t: &TupleView<'_>| EqualKey::new(right(t.get::<R>(0)))),
            })
        }

        fn compare<$($t,)+ R, K, Fl, Fr>(op: Comparison, left: Fl, right: Fr) -> Joiner<($($t,)+), R>
        where
            $($t: 'static,)+
            R: 'static,
            K: Ord + Debug + Send + Sync + 'static,
            Fl: Fn($(&$t),+) -> K + Send + Sync + 'static,
            Fr: Fn(&R) -> K + Send + Sync + 'static,
        {
            Joiner::from_component(JoinerComponent::Compare {
                op,
                left: Arc::new(move |t: &TupleView<'_>| RangeKey::new(left($(t.get::<$t>($i)),+))),
                right: Arc::new(move |t: &TupleView<'_>| RangeKey::new(right(t.get::<R>(0)))),
            })
        }

        /// Matches when the left key is strictly less than the right key.
        pub fn less_than<$($t,)+ R, K, Fl, Fr>(left: Fl, right: Fr) -> Joiner<($($t,)+), R>
        where
            $($t: 'static,)+
            R: 'static,
            K: Ord + Debug + Send + Sync + 'static,
            Fl: Fn($(&$t),+) -> K + Send + Sync + 'static,
            Fr: Fn(&R) -> K + Send + Sync + 'static,
        {
            compare(Comparison::LessThan, left, right)
        }

        pub fn less_than_or_equal<$($t,)+ R, K, Fl, Fr>(left: Fl, right: Fr) -> Joiner<($($t,)+), R>
        where
            $($t: 'static,)+
            R: 'static,
            K: Ord + Debug + Send + Sync + 'static,
            Fl: Fn($(&$t),+) -> K + Send + Sync + 'static,
            Fr: Fn(&R) -> K + Send + Sync + 'static,
        {
            compare(Comparison::LessThanOrEqual, left, right)
        }

        pub fn greater_than<$($t,)+ R, K, Fl, Fr>(left: Fl, right: Fr) -> Joiner<($($t,)+), R>
        where
            $($t: 'static,)+
            R: 'static,
            K: Ord + Debug + Send + Sync + 'static,
            Fl: Fn($(&$t),+) -> K + Send + Sync + 'static,
            Fr: Fn(&R) -> K + Send + Sync + 'static,
        {
            compare(Comparison::GreaterThan, left, right)
        }

        pub fn greater_than_or_equal<$($t,)+ R, K, Fl, Fr>(left: Fl, right: Fr) -> Joiner<($($t,)+), R>
        where
            $($t: 'static,)+
            R: 'static,
            K: Ord + Debug + Send + Sync + 'static,
            Fl: Fn($(&$t),+) -> K + Send + Sync + 'static,
            Fr: Fn(&R) -> K + Send + Sync + 'static,
        {
            compare(Comparison::GreaterThanOrEqual, left, right)
        }

        /// Matches when the half-open intervals `[start, end)` of both sides
        /// intersect.
        ///
        /// Indexed on `left.start < right.end`; `left.end > right.start` is
        /// checked per candidate.
        pub fn overlapping<$($t,)+ R, K, Fls, Fle, Frs, Fre>(
            left_start: Fls,
            left_end: Fle,
            right_start: Frs,
            right_end: Fre,
        ) -> Joiner<($($t,)+), R>
        where
            $($t: 'static,)+
            R: 'static,
            K: Ord + Debug + Send + Sync + 'static,
            Fls: Fn($(&$t),+) -> K + Send + Sync + 'static,
            Fle: Fn($(&$t),+) -> K + Send + Sync + 'static,
            Frs: Fn(&R) -> K + Send + Sync + 'static,
            Fre: Fn(&R) -> K + Send + Sync + 'static,
        {
            less_than(left_start, right_end).and(greater_than(left_end, right_start))
        }

        /// Matches when an arbitrary predicate over the joined elements holds.
        pub fn filtering<$($t,)+ R, F>(predicate: F) -> Joiner<($($t,)+), R>
        where
            $($t: 'static,)+
            R: 'static,
            F: Fn($(&$t,)+ &R) -> bool + Send + Sync + 'static,
        {
            Joiner::from_component(JoinerComponent::Filter(Arc::new(
                move |l: &TupleView<'_>, r: &TupleView<'_>| {
                    predicate($(l.get::<$t>($i),)+ r.get::<R>(0))
                },
            )))
        }
    };
}

mod uni {
    joiner_functions!(equal_bi; A: 0);
}

pub use uni::{
    equal_bi, filtering, greater_than, greater_than_or_equal, less_than, less_than_or_equal,
    overlapping,
};

/// Matches when one key function returns equal keys on both sides.
pub fn equal<A, K, F>(key: F) -> Joiner<(A,), A>
where
    A: 'static,
    K: std::hash::Hash + Eq + std::fmt::Debug + Send + Sync + 'static,
    F: Fn(&A) -> K + Send + Sync + 'static,
{
    let key = std::sync::Arc::new(key);
    let right = key.clone();
    equal_bi(move |a: &A| key(a), move |b: &A| right(b))
}

/// Joiners for a bi-stream left side.
pub mod bi {
    joiner_functions!(equal; A: 0, B: 1);
}

/// Joiners for a tri-stream left side.
pub mod tri {
    joiner_functions!(equal; A: 0, B: 1, C: 2);
}
