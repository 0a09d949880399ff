/// Priority class of one score level.
///
/// Returned by [`Score::level_label`](super::Score::level_label).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreLevel {
    /// Must be satisfied for feasibility.
    Hard,
    /// Secondary priority.
    Medium,
    /// Optimization objective.
    Soft,
}
