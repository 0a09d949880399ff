//! Core Score trait definition

use std::fmt::{Debug, Display};
use std::ops::{Add, Neg, Sub};

use thiserror::Error;

use super::ScoreLevel;

/// Core trait for all score types in ScoreForge.
///
/// A score is an immutable vector of integer levels, highest priority
/// first. The scoring engine only relies on this contract, so every shape
/// (single level, hard/soft, hard/medium/soft, bendable) is handled the
/// same way by accumulators and directors.
///
/// Implementations must be:
/// - `Copy` (accumulators store one per match)
/// - thread-safe, so independent score directors can run on separate workers
/// - totally ordered, comparing the highest level first
pub trait Score:
    Copy
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + PartialEq
    + Eq
    + PartialOrd
    + Ord
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Returns true if every hard level is non-negative.
    fn is_feasible(&self) -> bool;

    /// Returns the zero score (identity element for addition).
    fn zero() -> Self;

    /// Returns the number of score levels.
    fn levels_count() -> usize;

    /// Returns the level values, highest priority first.
    fn to_level_numbers(&self) -> Vec<i64>;

    /// Creates a score from level numbers.
    ///
    /// # Panics
    /// Panics if the number of levels doesn't match `levels_count()`.
    fn from_level_numbers(levels: &[i64]) -> Self;

    /// Multiplies every level by an integer match weight.
    ///
    /// Levels saturate at `i64::MIN`/`i64::MAX` rather than wrap, so a huge
    /// match weight still yields a score of the right sign.
    fn multiply_by(&self, factor: i64) -> Self;

    /// Returns the priority class of the level at `index`.
    ///
    /// # Panics
    /// Panics if `index >= levels_count()`.
    fn level_label(index: usize) -> ScoreLevel;

    /// Returns true if every level is zero.
    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

/// Scores that can be parsed from their display form.
///
/// Used for constraint weights supplied through configuration files.
pub trait ParseableScore: Score {
    /// Parses a score.
    ///
    /// # Format
    /// - SimpleScore: `"-42"`
    /// - HardSoftScore: `"0hard/-100soft"`
    /// - HardMediumSoftScore: `"0hard/0medium/-100soft"`
    /// - BendableScore: `"[0/-1]hard/[-2/0/-3]soft"`
    fn parse(s: &str) -> Result<Self, ScoreParseError>;

    /// Returns the string form accepted by [`ParseableScore::parse`].
    fn to_string_repr(&self) -> String;
}

/// Error when parsing a score from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Score parse error: {message}")]
pub struct ScoreParseError {
    pub message: String,
}

impl ScoreParseError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
