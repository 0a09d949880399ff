//! Score director trait definition.

use scoreforge_core::{Result, Score, ScoreForgeError};

use crate::api::{ConstraintMatchTotal, IndictmentMap, ScoreExplanation};
use crate::fact::{Fact, FactHandle, FactId, Facts};

/// Owns the working facts and keeps their score.
///
/// Search code mutates facts only through the director, bracketing every
/// change with the notifications below, and reads the score with
/// [`calculate_score`](Self::calculate_score) once the change (or its
/// undo) is complete.
///
/// The typed helpers ([`add_fact`](Self::add_fact),
/// [`change_fact`](Self::change_fact), ...) pair each mutation with the
/// right notifications and should be preferred over
/// [`facts_mut`](Self::facts_mut).
pub trait ScoreDirector<Sc: Score>: Send {
    fn facts(&self) -> &Facts;

    /// Raw access to the store. Every change made through it must be
    /// reported with the matching notification.
    fn facts_mut(&mut self) -> &mut Facts;

    /// Brings the score up to date with every notified change.
    fn calculate_score(&mut self) -> Result<Sc>;

    /// The fact is in the store and must now be scored.
    fn after_fact_added(&mut self, id: FactId) -> Result<()>;

    /// The fact is about to leave the store.
    fn before_fact_removed(&mut self, id: FactId) -> Result<()>;

    /// The fact is about to change.
    fn before_variable_changed(&mut self, id: FactId) -> Result<()>;

    /// The fact has changed.
    fn after_variable_changed(&mut self, id: FactId) -> Result<()>;

    /// Rebuilds all scoring state from the current facts.
    fn reset(&mut self) -> Result<()>;

    /// Returns true if the director updates scores incrementally.
    fn is_incremental(&self) -> bool {
        false
    }

    /// Per-constraint totals of the current facts.
    fn constraint_match_totals(&mut self) -> Result<Vec<ConstraintMatchTotal<Sc>>>;

    /// Per-constraint breakdown, worst first; lists individual matches when
    /// match tracking is enabled.
    fn explain_score(&mut self) -> Result<ScoreExplanation<Sc>>;

    /// Score impact per fact, built from the tracked matches.
    fn indictments(&mut self) -> Result<IndictmentMap<Sc>> {
        let explanation = self.explain_score()?;
        Ok(IndictmentMap::from_matches(
            explanation.all_matches().into_iter().cloned().collect(),
        ))
    }

    /// Removes a fact of any type.
    fn remove_fact_by_id(&mut self, id: FactId) -> Result<()> {
        self.before_fact_removed(id)?;
        if self.facts_mut().remove_any(id) {
            Ok(())
        } else {
            Err(ScoreForgeError::UnknownFact(format!("fact {:?} is not stored", id)))
        }
    }

    /// Stores a new fact and schedules it for scoring.
    fn add_fact<T: Fact>(&mut self, fact: T) -> Result<FactHandle<T>>
    where
        Self: Sized,
    {
        let handle = self.facts_mut().insert(fact);
        self.after_fact_added(handle.id())?;
        Ok(handle)
    }

    /// Removes a fact and returns it.
    fn remove_fact<T: Fact>(&mut self, handle: FactHandle<T>) -> Result<T>
    where
        Self: Sized,
    {
        if self.facts().get(handle).is_none() {
            return Err(ScoreForgeError::UnknownFact(format!(
                "{:?} is not stored",
                handle
            )));
        }
        self.before_fact_removed(handle.id())?;
        self.facts_mut().remove(handle).ok_or_else(|| {
            ScoreForgeError::InvalidState(format!("{:?} vanished during removal", handle))
        })
    }

    fn fact<T: Fact>(&self, handle: FactHandle<T>) -> Option<&T>
    where
        Self: Sized,
    {
        self.facts().get(handle)
    }

    /// Mutates a fact in place between the change notifications.
    fn change_fact<T, R, F>(&mut self, handle: FactHandle<T>, change: F) -> Result<R>
    where
        Self: Sized,
        T: Fact,
        F: FnOnce(&mut T) -> R,
    {
        let id = handle.id();
        self.before_variable_changed(id)?;
        let fact = self
            .facts_mut()
            .get_mut(handle)
            .ok_or_else(|| ScoreForgeError::UnknownFact(format!("{:?} is not stored", handle)))?;
        let result = change(fact);
        self.after_variable_changed(id)?;
        Ok(result)
    }
}
