//! Fluent constraint stream API.
//!
//! Streams describe a dataflow graph; nothing is evaluated until a
//! [`NetworkTemplate`](crate::network::NetworkTemplate) compiles the
//! finished constraints and a session is fed facts.
//!
//! ```text
//! ConstraintFactory::new()
//!     .for_each::<Shift>()             -> UniConstraintStream<Shift>
//!     .join::<Shift>(joiner)           -> BiConstraintStream<Shift, Shift>
//!     .filter(predicate)               -> BiConstraintStream<Shift, Shift>
//!     .penalize(weight)                -> ConstraintBuilder<Sc>
//!     .as_constraint(name)             -> Constraint<Sc>
//! ```
//!
//! Stream handles are cheap to clone. Constraints built from clones of one
//! handle share the nodes of that handle's prefix.

#[macro_use]
mod arity_stream_macros;
mod bi_stream;
pub mod collector;
mod constraint;
pub(crate) mod def;
mod factory;
pub(crate) mod function;
pub mod joiner;
mod quad_stream;
mod tri_stream;
mod uni_stream;

#[cfg(test)]
mod tests;

pub use bi_stream::BiConstraintStream;
pub use constraint::{Constraint, ConstraintBuilder};
pub use factory::{ConstraintFactory, ConstraintProvider};
pub use quad_stream::QuadConstraintStream;
pub use tri_stream::TriConstraintStream;
pub use uni_stream::UniConstraintStream;
