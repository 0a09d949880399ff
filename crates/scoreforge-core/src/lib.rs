//! ScoreForge Core - score values and shared vocabulary
//!
//! This crate provides the types every other ScoreForge crate speaks:
//! - Score types for representing solution quality
//! - Constraint identity and impact direction
//! - The error taxonomy of the scoring engine

pub mod constraint;
pub mod error;
pub mod score;

pub use constraint::{ConstraintRef, ImpactType};
pub use error::{Result, ScoreForgeError};
pub use score::{
    BendableScore, HardMediumSoftScore, HardSoftScore, ParseableScore, Score, ScoreLevel,
    ScoreParseError, SimpleScore,
};
