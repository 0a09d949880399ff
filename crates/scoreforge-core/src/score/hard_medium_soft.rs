//! HardMediumSoftScore - three-level score

/// A score with hard, medium and soft levels.
///
/// The medium level sits between feasibility and preferences, e.g. the
/// number of unassigned shifts in a roster that may stay partially empty.
///
/// # Examples
///
/// ```
/// use scoreforge_core::{HardMediumSoftScore, Score};
///
/// let a = HardMediumSoftScore::of(0, -1, 0);
/// let b = HardMediumSoftScore::of(0, 0, -500);
/// assert!(b > a);
/// assert!(a.is_feasible());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardMediumSoftScore {
    hard: i64,
    medium: i64,
    soft: i64,
}

impl HardMediumSoftScore {
    pub const ZERO: HardMediumSoftScore = HardMediumSoftScore::of(0, 0, 0);

    #[inline]
    pub const fn of(hard: i64, medium: i64, soft: i64) -> Self {
        HardMediumSoftScore { hard, medium, soft }
    }

    #[inline]
    pub const fn of_hard(hard: i64) -> Self {
        HardMediumSoftScore::of(hard, 0, 0)
    }

    #[inline]
    pub const fn of_medium(medium: i64) -> Self {
        HardMediumSoftScore::of(0, medium, 0)
    }

    #[inline]
    pub const fn of_soft(soft: i64) -> Self {
        HardMediumSoftScore::of(0, 0, soft)
    }

    #[inline]
    pub const fn hard(&self) -> i64 {
        self.hard
    }

    #[inline]
    pub const fn medium(&self) -> i64 {
        self.medium
    }

    #[inline]
    pub const fn soft(&self) -> i64 {
        self.soft
    }
}

impl_score_ops!(HardMediumSoftScore { hard, medium, soft } => of);
impl_score_levels!(HardMediumSoftScore { hard: Hard, medium: Medium, soft: Soft } => of);
impl_score_parse!(HardMediumSoftScore { hard => "hard", medium => "medium", soft => "soft" } => of);
