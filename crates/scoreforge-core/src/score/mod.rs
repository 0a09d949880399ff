//! Score types for representing solution quality
//!
//! Scores are immutable level vectors. They add, subtract and compare
//! lexicographically from the highest-priority level down.

#[macro_use]
mod macros;

mod bendable;
mod hard_medium_soft;
mod hard_soft;
mod level;
mod simple;
mod traits;


pub use bendable::BendableScore;
pub use hard_medium_soft::HardMediumSoftScore;
pub use hard_soft::HardSoftScore;
pub use level::ScoreLevel;
pub use simple::SimpleScore;
pub use traits::{ParseableScore, Score, ScoreParseError};
