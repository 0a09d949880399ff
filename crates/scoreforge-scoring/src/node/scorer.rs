use scoreforge_core::{ConstraintRef, ImpactType, Score};

use super::TupleOp;
use crate::error::{impossible, Result};
use crate::fact::Facts;
use crate::stream::function::TupleFn;
use crate::tuple::{InputStore, Tuple, TupleView};

/// How a constraint turns a match into a score.
pub(crate) enum Impact<Sc> {
    /// Every match counts the full weight.
    Fixed(Sc),
    /// The weight is multiplied by a per-match integer.
    Weighted(Sc, TupleFn<i64>),
    /// The match computes its own score.
    Dynamic(TupleFn<Sc>),
}

impl<Sc: Score> Clone for Impact<Sc> {
    fn clone(&self) -> Self {
        match self {
            Impact::Fixed(weight) => Impact::Fixed(*weight),
            Impact::Weighted(weight, multiplier) => Impact::Weighted(*weight, multiplier.clone()),
            Impact::Dynamic(scorer) => Impact::Dynamic(scorer.clone()),
        }
    }
}

impl<Sc: Score> Impact<Sc> {
    /// Unsigned score of one match.
    pub(crate) fn evaluate(&self, view: &TupleView<'_>) -> Sc {
        match self {
            Impact::Fixed(weight) => *weight,
            Impact::Weighted(weight, multiplier) => weight.multiply_by(multiplier(view)),
            Impact::Dynamic(scorer) => scorer(view),
        }
    }

    /// The configured weight; `None` for dynamic impacts.
    pub(crate) fn weight(&self) -> Option<Sc> {
        match self {
            Impact::Fixed(weight) | Impact::Weighted(weight, _) => Some(*weight),
            Impact::Dynamic(_) => None,
        }
    }

    /// The same impact with a replaced weight; `None` for dynamic impacts.
    pub(crate) fn reweighted(&self, weight: Sc) -> Option<Self> {
        match self {
            Impact::Fixed(_) => Some(Impact::Fixed(weight)),
            Impact::Weighted(_, multiplier) => Some(Impact::Weighted(weight, multiplier.clone())),
            Impact::Dynamic(_) => None,
        }
    }
}

/// A live match of one constraint.
pub(crate) struct ScoredMatch<Sc> {
    /// Signed contribution to the score.
    pub(crate) score: Sc,
    /// The matched tuple, kept only when match tracking is enabled.
    pub(crate) tuple: Option<Tuple>,
}

/// Terminal node of one constraint: keeps the score of every live match
/// and their running total.
pub(crate) struct Scorer<Sc> {
    constraint_ref: ConstraintRef,
    impact_type: ImpactType,
    impact: Impact<Sc>,
    track_matches: bool,
    matches: InputStore<ScoredMatch<Sc>>,
    total: Sc,
}

impl<Sc: Score> Scorer<Sc> {
    pub(crate) fn new(
        constraint_ref: ConstraintRef,
        impact_type: ImpactType,
        impact: Impact<Sc>,
        track_matches: bool,
    ) -> Self {
        Self {
            constraint_ref,
            impact_type,
            impact,
            track_matches,
            matches: InputStore::new(),
            total: Sc::zero(),
        }
    }

    pub(crate) fn constraint_ref(&self) -> &ConstraintRef {
        &self.constraint_ref
    }

    pub(crate) fn impact_type(&self) -> ImpactType {
        self.impact_type
    }

    pub(crate) fn weight(&self) -> Option<Sc> {
        self.impact.weight()
    }

    pub(crate) fn total(&self) -> Sc {
        self.total
    }

    pub(crate) fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub(crate) fn matches(&self) -> impl Iterator<Item = &ScoredMatch<Sc>> + '_ {
        self.matches.iter().map(|(_, scored)| scored)
    }

    fn signed(&self, tuple: &Tuple, facts: &Facts) -> Sc {
        let score = self.impact.evaluate(&TupleView::new(facts, tuple));
        match self.impact_type {
            ImpactType::Penalty => -score,
            ImpactType::Reward => score,
        }
    }

    /// Applies one flush's inbox, retractions first.
    pub(crate) fn apply(&mut self, mut inbox: Vec<TupleOp>, facts: &Facts) -> Result<()> {
        inbox.sort_by_key(TupleOp::phase);
        for op in inbox {
            match op {
                TupleOp::Insert { slot, tuple } => {
                    let score = self.signed(&tuple, facts);
                    self.total = self.total + score;
                    let tuple = self.track_matches.then_some(tuple);
                    self.matches.insert(slot, ScoredMatch { score, tuple })?;
                }
                TupleOp::Update { slot, tuple } => {
                    let score = self.signed(&tuple, facts);
                    let track = self.track_matches;
                    let scored = self.matches.get_mut(slot)?;
                    self.total = self.total - scored.score + score;
                    scored.score = score;
                    if track {
                        scored.tuple = Some(tuple);
                    }
                }
                TupleOp::Retract { slot } => {
                    let scored = self.matches.remove(slot)?;
                    self.total = self.total - scored.score;
                }
            }
        }
        Ok(())
    }

    /// Checks the running total against the sum of the stored matches.
    pub(crate) fn check_total(&self) -> Result<()> {
        let recomputed = self
            .matches()
            .fold(Sc::zero(), |total, scored| total + scored.score);
        if recomputed != self.total {
            return Err(impossible(format!(
                "constraint {} totals {} but its matches sum to {}",
                self.constraint_ref, self.total, recomputed
            )));
        }
        Ok(())
    }
}
