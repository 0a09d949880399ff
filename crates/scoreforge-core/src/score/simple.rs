//! SimpleScore - single-level score

use std::fmt;

use super::traits::{ParseableScore, ScoreParseError};

/// A score with a single integer level.
///
/// The level counts as hard: a negative simple score is infeasible.
///
/// # Examples
///
/// ```
/// use scoreforge_core::{SimpleScore, Score};
///
/// let worse = SimpleScore::of(-5);
/// let better = SimpleScore::of(-3);
///
/// assert!(better > worse);
/// assert!(!worse.is_feasible());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleScore {
    score: i64,
}

impl SimpleScore {
    pub const ZERO: SimpleScore = SimpleScore { score: 0 };

    #[inline]
    pub const fn of(score: i64) -> Self {
        SimpleScore { score }
    }

    #[inline]
    pub const fn score(&self) -> i64 {
        self.score
    }
}

impl_score_ops!(SimpleScore { score } => of);
impl_score_levels!(SimpleScore { score: Hard } => of);

impl fmt::Display for SimpleScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.score)
    }
}

impl ParseableScore for SimpleScore {
    fn parse(s: &str) -> Result<Self, ScoreParseError> {
        let s = s.trim();
        s.parse::<i64>()
            .map(SimpleScore::of)
            .map_err(|e| ScoreParseError::new(format!("Invalid SimpleScore '{}': {}", s, e)))
    }

    fn to_string_repr(&self) -> String {
        self.score.to_string()
    }
}

impl From<i64> for SimpleScore {
    fn from(score: i64) -> Self {
        SimpleScore::of(score)
    }
}
