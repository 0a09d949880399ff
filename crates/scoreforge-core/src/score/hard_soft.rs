//! HardSoftScore - two-level score with hard and soft levels

/// A score with separate hard and soft levels.
///
/// Hard levels decide feasibility; soft levels are only compared when the
/// hard levels are equal.
///
/// # Examples
///
/// ```
/// use scoreforge_core::HardSoftScore;
///
/// let infeasible = HardSoftScore::of(-1, -100);
/// let feasible = HardSoftScore::of(0, -200);
/// assert!(feasible > infeasible);
///
/// assert!(HardSoftScore::of(0, -50) > feasible);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardSoftScore {
    hard: i64,
    soft: i64,
}

impl HardSoftScore {
    pub const ZERO: HardSoftScore = HardSoftScore { hard: 0, soft: 0 };

    #[inline]
    pub const fn of(hard: i64, soft: i64) -> Self {
        HardSoftScore { hard, soft }
    }

    /// Weight of a hard constraint.
    #[inline]
    pub const fn of_hard(hard: i64) -> Self {
        HardSoftScore::of(hard, 0)
    }

    /// Weight of a soft constraint.
    #[inline]
    pub const fn of_soft(soft: i64) -> Self {
        HardSoftScore::of(0, soft)
    }

    #[inline]
    pub const fn hard(&self) -> i64 {
        self.hard
    }

    #[inline]
    pub const fn soft(&self) -> i64 {
        self.soft
    }
}

impl_score_ops!(HardSoftScore { hard, soft } => of);
impl_score_levels!(HardSoftScore { hard: Hard, soft: Soft } => of);
impl_score_parse!(HardSoftScore { hard => "hard", soft => "soft" } => of);
