use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use scoreforge_core::{Result, Score, ScoreForgeError};
use tracing::trace;

use super::template::Topology;
use crate::api::{ConstraintAnalysis, ConstraintJustification, ConstraintMatch, ConstraintMatchTotal};
use crate::fact::{FactId, Facts};
use crate::node::{apply_inbox, ForEachNode, Node, NodeKind, Scorer, Signal, Target, TupleOp};

#[derive(Debug, Clone, Copy)]
enum FactOp {
    Insert(FactId, TypeId),
    Update(FactId, TypeId),
    Retract(FactId, TypeId),
}

/// A live constraint network bound to one fact store.
///
/// Fact operations are queued and take effect on [`flush`](Self::flush).
/// Scores and totals read between flushes are exact; a flush that fails
/// part way leaves the session unusable, and every later call reports
/// [`ScoreForgeError::InvalidState`].
pub struct ConstraintSession<Sc: Score> {
    topology: Arc<Topology>,
    sources: Vec<ForEachNode>,
    nodes: Vec<Box<dyn Node>>,
    scorers: Vec<Scorer<Sc>>,
    known: HashMap<FactId, TypeId>,
    pending: Vec<FactOp>,
    interrupted: bool,
}

impl<Sc: Score> ConstraintSession<Sc> {
    pub(crate) fn new(
        topology: Arc<Topology>,
        sources: Vec<ForEachNode>,
        nodes: Vec<Box<dyn Node>>,
        scorers: Vec<Scorer<Sc>>,
    ) -> Self {
        Self {
            topology,
            sources,
            nodes,
            scorers,
            known: HashMap::new(),
            pending: Vec::new(),
            interrupted: false,
        }
    }

    fn guard(&self) -> Result<()> {
        if self.interrupted {
            return Err(ScoreForgeError::InvalidState(
                "a previous flush did not complete; rebuild the session".to_string(),
            ));
        }
        Ok(())
    }

    /// Queues a new fact.
    ///
    /// # Errors
    /// [`ScoreForgeError::DuplicateFact`] if the fact is already inserted.
    pub fn insert(&mut self, id: FactId, type_id: TypeId) -> Result<()> {
        self.guard()?;
        if self.known.contains_key(&id) {
            return Err(ScoreForgeError::DuplicateFact(format!(
                "fact {:?} is already inserted",
                id
            )));
        }
        self.known.insert(id, type_id);
        self.pending.push(FactOp::Insert(id, type_id));
        Ok(())
    }

    /// Queues a change of an inserted fact.
    pub fn update(&mut self, id: FactId) -> Result<()> {
        self.guard()?;
        let type_id = self.type_of(id)?;
        self.pending.push(FactOp::Update(id, type_id));
        Ok(())
    }

    /// Queues the removal of an inserted fact.
    pub fn retract(&mut self, id: FactId) -> Result<()> {
        self.guard()?;
        let type_id = self.type_of(id)?;
        self.known.remove(&id);
        self.pending.push(FactOp::Retract(id, type_id));
        Ok(())
    }

    fn type_of(&self, id: FactId) -> Result<TypeId> {
        self.known.get(&id).copied().ok_or_else(|| {
            ScoreForgeError::UnknownFact(format!("fact {:?} was never inserted", id))
        })
    }

    pub fn contains(&self, id: FactId) -> bool {
        self.known.contains_key(&id)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Propagates every queued operation through the network.
    ///
    /// Retracted facts must already be gone from `facts` and inserted or
    /// updated ones present in their new state.
    pub fn flush(&mut self, facts: &Facts) -> Result<()> {
        self.guard()?;
        if self.pending.is_empty() {
            return Ok(());
        }
        self.interrupted = true;
        let operations = std::mem::take(&mut self.pending);
        let count = operations.len();
        for operation in operations {
            self.apply_fact_op(operation)?;
        }

        let topology = self.topology.clone();
        let mut inboxes: Vec<Vec<Signal>> = vec![Vec::new(); self.nodes.len()];
        let mut scorer_inboxes: Vec<Vec<TupleOp>> = vec![Vec::new(); self.scorers.len()];
        let mut emitted = Vec::new();

        for (index, source) in self.sources.iter_mut().enumerate() {
            source.propagate(&mut emitted)?;
            route(
                &topology.source_children[index],
                &mut emitted,
                &mut inboxes,
                &mut scorer_inboxes,
            );
        }
        let mut signals = 0;
        for index in 0..self.nodes.len() {
            let inbox = std::mem::take(&mut inboxes[index]);
            if inbox.is_empty() {
                continue;
            }
            signals += inbox.len();
            let node = self.nodes[index].as_mut();
            apply_inbox(node, inbox, facts)?;
            node.propagate(&mut emitted)?;
            route(
                &topology.node_children[index],
                &mut emitted,
                &mut inboxes,
                &mut scorer_inboxes,
            );
        }
        for (scorer, inbox) in self.scorers.iter_mut().zip(scorer_inboxes) {
            if !inbox.is_empty() {
                signals += inbox.len();
                scorer.apply(inbox, facts)?;
            }
        }

        self.interrupted = false;
        trace!(event = "flush", operations = count, signals = signals);
        Ok(())
    }

    fn apply_fact_op(&mut self, operation: FactOp) -> Result<()> {
        let (FactOp::Insert(id, type_id) | FactOp::Update(id, type_id) | FactOp::Retract(id, type_id)) =
            operation;
        let Some(&index) = self.topology.source_by_type.get(&type_id) else {
            return Ok(());
        };
        let source = &mut self.sources[index];
        match operation {
            FactOp::Insert(..) => source.insert(id),
            FactOp::Update(..) => source.update(id),
            FactOp::Retract(..) => source.retract(id),
        }
    }

    /// Total score over every constraint.
    pub fn score(&self) -> Sc {
        self.scorers
            .iter()
            .fold(Sc::zero(), |total, scorer| total + scorer.total())
    }

    pub fn constraint_totals(&self) -> Vec<ConstraintMatchTotal<Sc>> {
        self.scorers
            .iter()
            .map(|scorer| ConstraintMatchTotal {
                constraint_ref: scorer.constraint_ref().clone(),
                impact_type: scorer.impact_type(),
                weight: scorer.weight(),
                score: scorer.total(),
                match_count: scorer.match_count(),
            })
            .collect()
    }

    /// Per-constraint analyses; individual matches are listed only when the
    /// session was instantiated with match tracking.
    pub fn constraint_analyses(&self, facts: &Facts) -> Vec<ConstraintAnalysis<Sc>> {
        self.scorers
            .iter()
            .zip(self.constraint_totals())
            .map(|(scorer, total)| {
                let matches = scorer
                    .matches()
                    .filter_map(|scored| {
                        let tuple = scored.tuple.as_ref()?;
                        Some(ConstraintMatch::new(
                            scorer.constraint_ref().clone(),
                            scored.score,
                            ConstraintJustification::from_elements(facts, tuple),
                        ))
                    })
                    .collect();
                ConstraintAnalysis::new(total, matches)
            })
            .collect()
    }

    /// Tuples currently held by all for-each and inner nodes.
    pub fn live_tuple_count(&self) -> usize {
        self.sources.iter().map(ForEachNode::live_tuples).sum::<usize>()
            + self.nodes.iter().map(|node| node.live_tuples()).sum::<usize>()
    }

    /// Live tuples of every node in propagation order, scorers last.
    pub fn node_tuple_counts(&self) -> Vec<(NodeKind, usize)> {
        let sources = self
            .sources
            .iter()
            .map(|source| (source.kind(), source.live_tuples()));
        let nodes = self.nodes.iter().map(|node| (node.kind(), node.live_tuples()));
        let scorers = self
            .scorers
            .iter()
            .map(|scorer| (NodeKind::Scorer, scorer.match_count()));
        sources.chain(nodes).chain(scorers).collect()
    }

    /// Checks that every node is quiescent and every running total equals
    /// the sum of its matches.
    pub fn check_invariants(&self) -> Result<()> {
        self.guard()?;
        for source in &self.sources {
            source.check_quiescent()?;
        }
        for node in &self.nodes {
            node.check_quiescent()?;
        }
        for scorer in &self.scorers {
            scorer.check_total()?;
        }
        Ok(())
    }
}

fn route(
    children: &[Target],
    emitted: &mut Vec<TupleOp>,
    inboxes: &mut [Vec<Signal>],
    scorer_inboxes: &mut [Vec<TupleOp>],
) {
    for op in emitted.drain(..) {
        for target in children {
            match *target {
                Target::Node { index, port } => inboxes[index].push(Signal {
                    port,
                    op: op.clone(),
                }),
                Target::Scorer(index) => scorer_inboxes[index].push(op.clone()),
            }
        }
    }
}

impl<Sc: Score> fmt::Debug for ConstraintSession<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintSession")
            .field("facts", &self.known.len())
            .field("pending", &self.pending.len())
            .field("live_tuples", &self.live_tuple_count())
            .field("score", &self.score())
            .finish()
    }
}
