//! Non-incremental score director.

use std::fmt;
use std::sync::Arc;

use scoreforge_core::{Result, Score, ScoreForgeError};
use tracing::trace;

use super::stream::load;
use super::ScoreDirector;
use crate::api::{ConstraintMatchTotal, ScoreExplanation};
use crate::fact::{FactId, Facts};
use crate::network::NetworkTemplate;

/// Score director that rebuilds a fresh session for every calculation.
///
/// Notifications only mark the cached score stale. Useful as a reference
/// when checking [`StreamScoreDirector`](super::StreamScoreDirector) and for
/// one-off evaluations where building the live network costs more than it
/// saves.
pub struct SimpleScoreDirector<Sc: Score> {
    template: Arc<NetworkTemplate<Sc>>,
    facts: Facts,
    cached_score: Option<Sc>,
    track_matches: bool,
}

impl<Sc: Score> SimpleScoreDirector<Sc> {
    pub fn new(template: Arc<NetworkTemplate<Sc>>, facts: Facts) -> Self {
        Self {
            template,
            facts,
            cached_score: None,
            track_matches: false,
        }
    }

    /// Keep per-match justifications in [`explain_score`](ScoreDirector::explain_score).
    pub fn with_match_tracking(mut self, enabled: bool) -> Self {
        self.track_matches = enabled;
        self
    }

    pub fn is_score_dirty(&self) -> bool {
        self.cached_score.is_none()
    }

    pub fn into_facts(self) -> Facts {
        self.facts
    }

    fn mark_dirty(&mut self) {
        self.cached_score = None;
    }

    fn require(&self, id: FactId) -> Result<()> {
        if self.facts.contains(id) {
            Ok(())
        } else {
            Err(ScoreForgeError::UnknownFact(format!(
                "fact {:?} is not stored",
                id
            )))
        }
    }
}

impl<Sc: Score> ScoreDirector<Sc> for SimpleScoreDirector<Sc> {
    fn facts(&self) -> &Facts {
        &self.facts
    }

    fn facts_mut(&mut self) -> &mut Facts {
        self.mark_dirty();
        &mut self.facts
    }

    fn calculate_score(&mut self) -> Result<Sc> {
        if let Some(score) = self.cached_score {
            return Ok(score);
        }
        let score = load(&self.template, &self.facts, false)?.score();
        trace!(event = "score_calculated", score = %score, incremental = false);
        self.cached_score = Some(score);
        Ok(score)
    }

    fn after_fact_added(&mut self, id: FactId) -> Result<()> {
        self.require(id)?;
        self.mark_dirty();
        Ok(())
    }

    fn before_fact_removed(&mut self, id: FactId) -> Result<()> {
        self.require(id)?;
        self.mark_dirty();
        Ok(())
    }

    fn before_variable_changed(&mut self, id: FactId) -> Result<()> {
        self.require(id)
    }

    fn after_variable_changed(&mut self, id: FactId) -> Result<()> {
        self.require(id)?;
        self.mark_dirty();
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.mark_dirty();
        Ok(())
    }

    fn constraint_match_totals(&mut self) -> Result<Vec<ConstraintMatchTotal<Sc>>> {
        Ok(load(&self.template, &self.facts, false)?.constraint_totals())
    }

    fn explain_score(&mut self) -> Result<ScoreExplanation<Sc>> {
        let session = load(&self.template, &self.facts, self.track_matches)?;
        let score = session.score();
        self.cached_score = Some(score);
        Ok(ScoreExplanation::new(
            score,
            session.constraint_analyses(&self.facts),
        ))
    }
}

impl<Sc: Score> fmt::Debug for SimpleScoreDirector<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleScoreDirector")
            .field("facts", &self.facts.len())
            .field("cached_score", &self.cached_score)
            .finish()
    }
}
