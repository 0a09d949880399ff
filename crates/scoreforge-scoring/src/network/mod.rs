//! Compiled constraint networks.
//!
//! A [`NetworkTemplate`] is the immutable, shareable layout of the nodes
//! behind a set of constraints. Each score director instantiates its own
//! [`ConstraintSession`] from it; sessions share nothing mutable.

mod session;
mod template;


pub use session::ConstraintSession;
pub use template::{NetworkStats, NetworkTemplate};
