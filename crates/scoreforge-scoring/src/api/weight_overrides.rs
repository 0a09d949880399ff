//! Runtime constraint weight configuration.
//!
//! Overrides adjust constraint weights without touching the constraint
//! definitions; they take effect when a network template is built.

use std::collections::HashMap;
use std::fmt::Debug;

use scoreforge_config::ScoreDirectorConfig;
use scoreforge_core::{ParseableScore, Result, Score, ScoreForgeError};

/// Replacement weights keyed by constraint full name (`package/name`, or
/// just `name` for the default package).
///
/// A zero weight disables the constraint: the network is built without it.
#[derive(Clone)]
pub struct ConstraintWeightOverrides<Sc: Score> {
    weights: HashMap<String, Sc>,
}

impl<Sc: Score> Debug for ConstraintWeightOverrides<Sc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintWeightOverrides")
            .field("count", &self.weights.len())
            .finish()
    }
}

impl<Sc: Score> Default for ConstraintWeightOverrides<Sc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Sc: Score> ConstraintWeightOverrides<Sc> {
    pub fn new() -> Self {
        Self {
            weights: HashMap::new(),
        }
    }

    pub fn from_pairs<I, N>(iter: I) -> Self
    where
        I: IntoIterator<Item = (N, Sc)>,
        N: Into<String>,
    {
        let weights = iter.into_iter().map(|(n, w)| (n.into(), w)).collect();
        Self { weights }
    }

    pub fn put<N: Into<String>>(&mut self, name: N, weight: Sc) {
        self.weights.insert(name.into(), weight);
    }

    pub fn remove(&mut self, name: &str) -> Option<Sc> {
        self.weights.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Sc> {
        self.weights.get(name).copied()
    }

    pub fn get_or_default(&self, name: &str, default: Sc) -> Sc {
        self.get(name).unwrap_or(default)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.weights.contains_key(name)
    }

    /// Overridden constraint names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.weights.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn clear(&mut self) {
        self.weights.clear();
    }
}

impl<Sc: ParseableScore> ConstraintWeightOverrides<Sc> {
    /// Parses the `constraint_weights` table of a configuration.
    pub fn from_config(config: &ScoreDirectorConfig) -> Result<Self> {
        let pairs = config
            .parsed_constraint_weights::<Sc>()
            .map_err(|e| ScoreForgeError::Config(e.to_string()))?;
        Ok(Self::from_pairs(pairs))
    }
}
