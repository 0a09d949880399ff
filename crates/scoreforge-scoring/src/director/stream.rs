//! Incremental score director over a live constraint network.

use std::fmt;
use std::sync::Arc;

use scoreforge_config::{EnvironmentMode, ScoreDirectorConfig};
use scoreforge_core::{ParseableScore, Result, Score, ScoreForgeError};
use tracing::{debug, error, trace};

use super::{ScoreDirector, ScoreDirectorFactory};
use crate::api::{ConstraintMatchTotal, ScoreExplanation};
use crate::fact::{FactId, Facts};
use crate::network::{ConstraintSession, NetworkTemplate};
use crate::stream::ConstraintProvider;

/// Score director that keeps one live session in step with its facts.
///
/// Change notifications are queued on the session and propagated when the
/// score is next requested, so a move and its undo cost two flushes no
/// matter how many constraints read the moved fact.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use scoreforge_core::SimpleScore;
/// use scoreforge_scoring::prelude::*;
///
/// #[derive(Clone, Debug)]
/// struct Task { machine: u32 }
///
/// let template = NetworkTemplate::build(vec![
///     ConstraintFactory::new()
///         .for_each_unique_pair::<Task>(joiner::equal(|t: &Task| t.machine))
///         .penalize(SimpleScore::of(1))
///         .as_constraint("Machine conflict"),
/// ]).unwrap();
///
/// let mut director = StreamScoreDirector::new(Arc::new(template), Facts::new()).unwrap();
/// let a = director.add_fact(Task { machine: 1 }).unwrap();
/// director.add_fact(Task { machine: 2 }).unwrap();
/// assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(0));
///
/// director.change_fact(a, |task| task.machine = 2).unwrap();
/// assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-1));
/// ```
pub struct StreamScoreDirector<Sc: Score> {
    template: Arc<NetworkTemplate<Sc>>,
    facts: Facts,
    session: ConstraintSession<Sc>,
    environment_mode: EnvironmentMode,
    track_matches: bool,
    calculation_count: u64,
}

impl<Sc: Score> StreamScoreDirector<Sc> {
    /// Creates a director and inserts every fact already in the store.
    pub fn new(template: Arc<NetworkTemplate<Sc>>, facts: Facts) -> Result<Self> {
        Self::with_settings(template, facts, EnvironmentMode::default(), false)
    }

    /// Creates a director honoring the environment mode and match tracking
    /// of `config`. Weight overrides must already be applied to `template`.
    pub fn with_config(
        template: Arc<NetworkTemplate<Sc>>,
        facts: Facts,
        config: &ScoreDirectorConfig,
    ) -> Result<Self> {
        Self::with_settings(
            template,
            facts,
            config.environment_mode,
            config.constraint_match_enabled,
        )
    }

    pub(crate) fn with_settings(
        template: Arc<NetworkTemplate<Sc>>,
        facts: Facts,
        environment_mode: EnvironmentMode,
        track_matches: bool,
    ) -> Result<Self> {
        let session = load(&template, &facts, track_matches)?;
        debug!(
            event = "director_created",
            facts = facts.len(),
            constraints = template.constraint_count(),
            environment_mode = ?environment_mode,
            track_matches = track_matches,
        );
        Ok(Self {
            template,
            facts,
            session,
            environment_mode,
            track_matches,
            calculation_count: 0,
        })
    }

    pub fn template(&self) -> &Arc<NetworkTemplate<Sc>> {
        &self.template
    }

    pub fn session(&self) -> &ConstraintSession<Sc> {
        &self.session
    }

    pub fn environment_mode(&self) -> EnvironmentMode {
        self.environment_mode
    }

    /// Number of completed score calculations.
    pub fn calculation_count(&self) -> u64 {
        self.calculation_count
    }

    pub fn into_facts(self) -> Facts {
        self.facts
    }

    fn assert_from_scratch(&self, score: Sc) -> Result<()> {
        let fresh = load(&self.template, &self.facts, false)?;
        let expected = fresh.score();
        if expected == score {
            return Ok(());
        }
        let diverged: Vec<String> = self
            .session
            .constraint_totals()
            .into_iter()
            .zip(fresh.constraint_totals())
            .filter(|(working, scratch)| working.score != scratch.score)
            .map(|(working, scratch)| {
                format!(
                    "'{}' is {} but should be {}",
                    working.constraint_ref, working.score, scratch.score
                )
            })
            .collect();
        error!(
            event = "score_corruption",
            working = %score,
            expected = %expected,
            calculation = self.calculation_count,
        );
        Err(ScoreForgeError::ScoreCorruption(format!(
            "working score {} differs from recalculated score {}: {}",
            score,
            expected,
            diverged.join("; ")
        )))
    }
}

impl<Sc: ParseableScore> StreamScoreDirector<Sc> {
    /// Compiles the provider's constraints with the weight overrides of
    /// `config` and loads `facts` into a new director.
    pub fn from_provider<P>(provider: &P, facts: Facts, config: &ScoreDirectorConfig) -> Result<Self>
    where
        P: ConstraintProvider<Sc> + ?Sized,
    {
        ScoreDirectorFactory::from_provider(provider, config.clone())?.build_score_director(facts)
    }
}

/// A fresh session holding every fact of the store.
pub(crate) fn load<Sc: Score>(
    template: &NetworkTemplate<Sc>,
    facts: &Facts,
    track_matches: bool,
) -> Result<ConstraintSession<Sc>> {
    let mut session = template.instantiate(track_matches);
    for (id, type_id) in facts.iter() {
        session.insert(id, type_id)?;
    }
    session.flush(facts)?;
    Ok(session)
}

impl<Sc: Score> ScoreDirector<Sc> for StreamScoreDirector<Sc> {
    fn facts(&self) -> &Facts {
        &self.facts
    }

    fn facts_mut(&mut self) -> &mut Facts {
        &mut self.facts
    }

    fn calculate_score(&mut self) -> Result<Sc> {
        self.session.flush(&self.facts)?;
        self.calculation_count += 1;
        let score = self.session.score();
        trace!(event = "score_calculated", score = %score, calculation = self.calculation_count);
        if self.environment_mode.is_asserted() {
            self.session.check_invariants()?;
        }
        if self.environment_mode.is_fully_asserted() {
            self.assert_from_scratch(score)?;
        }
        Ok(score)
    }

    fn after_fact_added(&mut self, id: FactId) -> Result<()> {
        let type_id = self.facts.type_of(id).ok_or_else(|| {
            ScoreForgeError::UnknownFact(format!("fact {:?} is not stored", id))
        })?;
        self.session.insert(id, type_id)
    }

    fn before_fact_removed(&mut self, id: FactId) -> Result<()> {
        self.session.retract(id)
    }

    fn before_variable_changed(&mut self, id: FactId) -> Result<()> {
        if self.session.contains(id) {
            Ok(())
        } else {
            Err(ScoreForgeError::UnknownFact(format!(
                "fact {:?} was never inserted",
                id
            )))
        }
    }

    fn after_variable_changed(&mut self, id: FactId) -> Result<()> {
        self.session.update(id)
    }

    fn reset(&mut self) -> Result<()> {
        self.session = load(&self.template, &self.facts, self.track_matches)?;
        debug!(event = "director_reset", facts = self.facts.len());
        Ok(())
    }

    fn is_incremental(&self) -> bool {
        true
    }

    fn constraint_match_totals(&mut self) -> Result<Vec<ConstraintMatchTotal<Sc>>> {
        self.session.flush(&self.facts)?;
        Ok(self.session.constraint_totals())
    }

    fn explain_score(&mut self) -> Result<ScoreExplanation<Sc>> {
        let score = self.calculate_score()?;
        Ok(ScoreExplanation::new(
            score,
            self.session.constraint_analyses(&self.facts),
        ))
    }
}

impl<Sc: Score> fmt::Debug for StreamScoreDirector<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamScoreDirector")
            .field("facts", &self.facts.len())
            .field("environment_mode", &self.environment_mode)
            .field("session", &self.session)
            .finish()
    }
}
