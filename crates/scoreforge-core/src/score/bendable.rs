//! BendableScore - configurable number of hard and soft levels

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};

use super::traits::{ParseableScore, Score, ScoreParseError};
use super::ScoreLevel;

/// A score with `H` hard levels followed by `S` soft levels.
///
/// The level counts are part of the type, so `zero()` is well defined and
/// two bendable scores of different shapes can never be mixed.
///
/// # Examples
///
/// ```
/// use scoreforge_core::{BendableScore, Score};
///
/// let a = BendableScore::<1, 2>::of([0], [-3, 0]);
/// let b = BendableScore::<1, 2>::of([0], [0, -10]);
/// assert!(b > a);
/// assert!(a.is_feasible());
/// assert_eq!(BendableScore::<1, 2>::levels_count(), 3);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BendableScore<const H: usize, const S: usize> {
    hard: [i64; H],
    soft: [i64; S],
}

impl<const H: usize, const S: usize> BendableScore<H, S> {
    /// The zero score.
    pub const ZERO: Self = BendableScore {
        hard: [0; H],
        soft: [0; S],
    };

    /// Creates a score from its hard and soft levels.
    pub const fn of(hard: [i64; H], soft: [i64; S]) -> Self {
        BendableScore { hard, soft }
    }

    /// One point on a single hard level.
    ///
    /// # Panics
    /// Panics if `level >= H`.
    pub fn one_hard(level: usize) -> Self {
        let mut score = Self::ZERO;
        score.hard[level] = 1;
        score
    }

    /// One point on a single soft level.
    ///
    /// # Panics
    /// Panics if `level >= S`.
    pub fn one_soft(level: usize) -> Self {
        let mut score = Self::ZERO;
        score.soft[level] = 1;
        score
    }

    pub fn hard_score(&self, level: usize) -> i64 {
        self.hard[level]
    }

    pub fn soft_score(&self, level: usize) -> i64 {
        self.soft[level]
    }

    pub fn hard_scores(&self) -> &[i64] {
        &self.hard
    }

    pub fn soft_scores(&self) -> &[i64] {
        &self.soft
    }

    fn map(&self, f: impl Fn(i64) -> i64) -> Self {
        BendableScore {
            hard: self.hard.map(&f),
            soft: self.soft.map(&f),
        }
    }

    fn zip(&self, other: &Self, f: impl Fn(i64, i64) -> i64) -> Self {
        let mut out = *self;
        for (a, b) in out.hard.iter_mut().zip(other.hard.iter()) {
            *a = f(*a, *b);
        }
        for (a, b) in out.soft.iter_mut().zip(other.soft.iter()) {
            *a = f(*a, *b);
        }
        out
    }
}

impl<const H: usize, const S: usize> Default for BendableScore<H, S> {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<const H: usize, const S: usize> Score for BendableScore<H, S> {
    fn is_feasible(&self) -> bool {
        self.hard.iter().all(|&level| level >= 0)
    }

    fn zero() -> Self {
        Self::ZERO
    }

    fn levels_count() -> usize {
        H + S
    }

    fn to_level_numbers(&self) -> Vec<i64> {
        self.hard.iter().chain(self.soft.iter()).copied().collect()
    }

    fn from_level_numbers(levels: &[i64]) -> Self {
        assert_eq!(
            levels.len(),
            H + S,
            "BendableScore requires exactly {} levels",
            H + S
        );
        let mut score = Self::ZERO;
        score.hard.copy_from_slice(&levels[..H]);
        score.soft.copy_from_slice(&levels[H..]);
        score
    }

    fn multiply_by(&self, factor: i64) -> Self {
        self.map(|level| level.saturating_mul(factor))
    }

    fn level_label(index: usize) -> ScoreLevel {
        if index < H {
            ScoreLevel::Hard
        } else if index < H + S {
            ScoreLevel::Soft
        } else {
            panic!("BendableScore has {} levels, got index {}", H + S, index)
        }
    }
}

impl<const H: usize, const S: usize> Ord for BendableScore<H, S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hard
            .cmp(&other.hard)
            .then_with(|| self.soft.cmp(&other.soft))
    }
}

impl<const H: usize, const S: usize> PartialOrd for BendableScore<H, S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const H: usize, const S: usize> Add for BendableScore<H, S> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.zip(&other, |a, b| a + b)
    }
}

impl<const H: usize, const S: usize> Sub for BendableScore<H, S> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.zip(&other, |a, b| a - b)
    }
}

impl<const H: usize, const S: usize> Neg for BendableScore<H, S> {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|level| -level)
    }
}

fn join_levels(levels: &[i64]) -> String {
    levels
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

impl<const H: usize, const S: usize> fmt::Debug for BendableScore<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BendableScore({:?}, {:?})", self.hard, self.soft)
    }
}

impl<const H: usize, const S: usize> fmt::Display for BendableScore<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}]hard/[{}]soft",
            join_levels(&self.hard),
            join_levels(&self.soft)
        )
    }
}

fn parse_levels<const N: usize>(part: &str, label: &str) -> Result<[i64; N], ScoreParseError> {
    let inner = part
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| ScoreParseError::new(format!("{} part '{}' must be bracketed", label, part)))?;

    let mut levels = [0; N];
    let values: Vec<&str> = if inner.is_empty() {
        Vec::new()
    } else {
        inner.split('/').collect()
    };
    if values.len() != N {
        return Err(ScoreParseError::new(format!(
            "expected {} {} levels, found {}",
            N,
            label,
            values.len()
        )));
    }
    for (slot, value) in levels.iter_mut().zip(values) {
        *slot = value.trim().parse::<i64>().map_err(|e| {
            ScoreParseError::new(format!("Invalid {} level '{}': {}", label, value, e))
        })?;
    }
    Ok(levels)
}

impl<const H: usize, const S: usize> ParseableScore for BendableScore<H, S> {
    fn parse(s: &str) -> Result<Self, ScoreParseError> {
        let s = s.trim();
        let (hard, soft) = s.split_once("hard/").ok_or_else(|| {
            ScoreParseError::new(format!(
                "Invalid BendableScore format '{}': expected '[..]hard/[..]soft'",
                s
            ))
        })?;
        let soft = soft.strip_suffix("soft").ok_or_else(|| {
            ScoreParseError::new(format!("BendableScore '{}' must end with 'soft'", s))
        })?;
        Ok(BendableScore::of(
            parse_levels::<H>(hard, "hard")?,
            parse_levels::<S>(soft, "soft")?,
        ))
    }

    fn to_string_repr(&self) -> String {
        self.to_string()
    }
}

#[cfg(feature = "serde")]
impl<const H: usize, const S: usize> serde::Serialize for BendableScore<H, S> {
    fn serialize<Ser: serde::Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.serialize_str(&self.to_string_repr())
    }
}

#[cfg(feature = "serde")]
impl<'de, const H: usize, const S: usize> serde::Deserialize<'de> for BendableScore<H, S> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = <String as serde::Deserialize>::deserialize(deserializer)?;
        Self::parse(&repr).map_err(serde::de::Error::custom)
    }
}
