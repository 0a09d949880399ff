//! Score analysis types.
//!
//! With constraint-match tracking enabled, every live match of every
//! constraint keeps the tuple that produced it. The types here turn those
//! tuples into per-constraint explanations and per-fact indictments.

use std::fmt;

use indexmap::IndexMap;
use scoreforge_core::{ConstraintRef, ImpactType, Score};

use crate::fact::{FactId, Facts};
use crate::tuple::{Element, Value};

/// A fact involved in a constraint match.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FactRef {
    pub id: FactId,
    /// Short type name, e.g. `"Shift"`.
    pub type_name: &'static str,
    /// `Debug` rendering of the fact when the match was analyzed.
    pub display: String,
}

impl FactRef {
    pub fn new(id: FactId, type_name: &'static str, display: impl Into<String>) -> Self {
        Self {
            id,
            type_name,
            display: display.into(),
        }
    }

    pub(crate) fn from_store(facts: &Facts, id: FactId) -> Option<Self> {
        Some(Self {
            id,
            type_name: facts.type_name_of(id)?,
            display: facts.describe(id)?,
        })
    }
}

impl fmt::Debug for FactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{} {}", self.type_name, self.id, self.display)
    }
}

/// Why a constraint matched: the facts and derived values of the match.
#[derive(Debug, Clone)]
pub struct ConstraintJustification {
    pub facts: Vec<FactRef>,
    pub description: String,
}

impl ConstraintJustification {
    pub fn new(facts: Vec<FactRef>) -> Self {
        let description = if facts.is_empty() {
            "No facts".to_string()
        } else {
            facts
                .iter()
                .map(|fact| fact.display.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        Self { facts, description }
    }

    pub fn with_description(facts: Vec<FactRef>, description: String) -> Self {
        Self { facts, description }
    }

    pub(crate) fn from_elements(facts: &Facts, elements: &[Element]) -> Self {
        let mut refs = Vec::new();
        let mut parts = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                Element::Fact(id) => match FactRef::from_store(facts, *id) {
                    Some(fact) => {
                        parts.push(fact.display.clone());
                        refs.push(fact);
                    }
                    None => parts.push(format!("{:?}", id)),
                },
                Element::Value(value) => {
                    let value: &dyn Value = &**value;
                    parts.push(format!("{:?}", value));
                }
            }
        }
        Self {
            facts: refs,
            description: parts.join(", "),
        }
    }

    /// True if the match involves the fact.
    pub fn involves(&self, id: FactId) -> bool {
        self.facts.iter().any(|fact| fact.id == id)
    }
}

/// One live match of a constraint.
#[derive(Debug, Clone)]
pub struct ConstraintMatch<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    /// Signed score impact of this match.
    pub score: Sc,
    pub justification: ConstraintJustification,
}

impl<Sc: Score> ConstraintMatch<Sc> {
    pub fn new(
        constraint_ref: ConstraintRef,
        score: Sc,
        justification: ConstraintJustification,
    ) -> Self {
        Self {
            constraint_ref,
            score,
            justification,
        }
    }
}

/// Running total of one constraint; always available, tracking or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintMatchTotal<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    pub impact_type: ImpactType,
    /// Constant weight; `None` when each match computes its own score.
    pub weight: Option<Sc>,
    pub score: Sc,
    pub match_count: usize,
}

impl<Sc: Score> ConstraintMatchTotal<Sc> {
    pub fn is_hard(&self) -> bool {
        self.weight
            .and_then(|weight| weight.to_level_numbers().first().copied())
            .is_some_and(|hard| hard != 0)
    }
}

/// Per-constraint breakdown in a score explanation.
#[derive(Debug, Clone)]
pub struct ConstraintAnalysis<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    pub weight: Option<Sc>,
    pub score: Sc,
    /// Individual matches; empty unless match tracking is enabled.
    pub matches: Vec<ConstraintMatch<Sc>>,
    pub match_count: usize,
    pub is_hard: bool,
}

impl<Sc: Score> ConstraintAnalysis<Sc> {
    pub fn new(total: ConstraintMatchTotal<Sc>, matches: Vec<ConstraintMatch<Sc>>) -> Self {
        let is_hard = total.is_hard();
        Self {
            constraint_ref: total.constraint_ref,
            weight: total.weight,
            score: total.score,
            matches,
            match_count: total.match_count,
            is_hard,
        }
    }

    pub fn name(&self) -> &str {
        &self.constraint_ref.name
    }
}

/// Complete score explanation, worst constraint first.
#[derive(Debug, Clone)]
pub struct ScoreExplanation<Sc: Score> {
    pub score: Sc,
    pub constraint_analyses: Vec<ConstraintAnalysis<Sc>>,
}

impl<Sc: Score> ScoreExplanation<Sc> {
    pub fn new(score: Sc, mut constraint_analyses: Vec<ConstraintAnalysis<Sc>>) -> Self {
        constraint_analyses.sort_by(|a, b| a.score.cmp(&b.score));
        Self {
            score,
            constraint_analyses,
        }
    }

    pub fn total_match_count(&self) -> usize {
        self.constraint_analyses.iter().map(|a| a.match_count).sum()
    }

    pub fn non_zero_constraints(&self) -> Vec<&ConstraintAnalysis<Sc>> {
        self.constraint_analyses
            .iter()
            .filter(|a| a.score != Sc::zero())
            .collect()
    }

    pub fn all_matches(&self) -> Vec<&ConstraintMatch<Sc>> {
        self.constraint_analyses
            .iter()
            .flat_map(|a| &a.matches)
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&ConstraintAnalysis<Sc>> {
        self.constraint_analyses
            .iter()
            .find(|a| a.constraint_ref.name == name || a.constraint_ref.full_name() == name)
    }
}

/// How a single fact impacts the score.
#[derive(Debug, Clone)]
pub struct Indictment<Sc: Score> {
    pub fact: FactRef,
    /// Sum of the scores of every match involving the fact.
    pub score: Sc,
    pub constraint_matches: IndexMap<ConstraintRef, Vec<ConstraintMatch<Sc>>>,
}

impl<Sc: Score> Indictment<Sc> {
    pub fn new(fact: FactRef) -> Self {
        Self {
            fact,
            score: Sc::zero(),
            constraint_matches: IndexMap::new(),
        }
    }

    pub fn add_match(&mut self, constraint_match: ConstraintMatch<Sc>) {
        self.score = self.score + constraint_match.score;
        self.constraint_matches
            .entry(constraint_match.constraint_ref.clone())
            .or_default()
            .push(constraint_match);
    }

    pub fn match_count(&self) -> usize {
        self.constraint_matches.values().map(Vec::len).sum()
    }

    pub fn violated_constraints(&self) -> Vec<&ConstraintRef> {
        self.constraint_matches.keys().collect()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraint_matches.len()
    }
}

/// Indictments of every fact involved in at least one match.
#[derive(Debug, Clone)]
pub struct IndictmentMap<Sc: Score> {
    pub indictments: IndexMap<FactId, Indictment<Sc>>,
}

impl<Sc: Score> IndictmentMap<Sc> {
    pub fn new() -> Self {
        Self {
            indictments: IndexMap::new(),
        }
    }

    /// Indicts each fact of each match once per match.
    pub fn from_matches(matches: Vec<ConstraintMatch<Sc>>) -> Self {
        let mut map = Self::new();
        for m in matches {
            let mut seen: Vec<FactId> = Vec::with_capacity(m.justification.facts.len());
            for fact in &m.justification.facts {
                if seen.contains(&fact.id) {
                    continue;
                }
                seen.push(fact.id);
                map.indictments
                    .entry(fact.id)
                    .or_insert_with(|| Indictment::new(fact.clone()))
                    .add_match(m.clone());
            }
        }
        map
    }

    pub fn get(&self, id: FactId) -> Option<&Indictment<Sc>> {
        self.indictments.get(&id)
    }

    pub fn fact_ids(&self) -> impl Iterator<Item = FactId> + '_ {
        self.indictments.keys().copied()
    }

    /// Facts sorted by score impact, most negative first.
    pub fn worst_facts(&self) -> Vec<&FactRef> {
        let mut indictments: Vec<&Indictment<Sc>> = self.indictments.values().collect();
        indictments.sort_by(|a, b| a.score.cmp(&b.score));
        indictments.into_iter().map(|i| &i.fact).collect()
    }

    pub fn len(&self) -> usize {
        self.indictments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indictments.is_empty()
    }
}

impl<Sc: Score> Default for IndictmentMap<Sc> {
    fn default() -> Self {
        Self::new()
    }
}
