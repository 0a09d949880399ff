use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use scoreforge_core::{ConstraintRef, ImpactType, Result, Score, ScoreForgeError};
use tracing::{debug, info};

use super::session::ConstraintSession;
use crate::api::ConstraintWeightOverrides;
use crate::node::{ForEachNode, Impact, Node, NodeKind, Port, Scorer, Target};
use crate::stream::def::{StreamDef, StreamKind};
use crate::stream::Constraint;

/// Where a stream's tuples come from once compiled.
#[derive(Debug, Clone, Copy)]
enum Producer {
    Source(usize),
    Node(usize),
}

struct SourceSpec {
    type_name: &'static str,
    children: Vec<Target>,
}

struct NodeSpec {
    def: Arc<StreamDef>,
    layer: usize,
    children: Vec<Target>,
}

pub(crate) struct ScorerSpec<Sc: Score> {
    constraint_ref: ConstraintRef,
    impact_type: ImpactType,
    impact: Impact<Sc>,
}

/// Routing tables shared by every session of a template.
pub(crate) struct Topology {
    pub(crate) source_by_type: HashMap<TypeId, usize>,
    pub(crate) source_children: Vec<Vec<Target>>,
    pub(crate) node_children: Vec<Vec<Target>>,
}

/// Node counts of a compiled network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkStats {
    /// Nodes per kind; scorers count one per constraint.
    pub nodes_by_kind: Vec<(NodeKind, usize)>,
    /// Stream references resolved to an already built node.
    pub shared_nodes: usize,
    pub constraints: usize,
    /// Constraints left out because their weight was overridden to zero.
    pub disabled_constraints: usize,
}

impl NetworkStats {
    pub fn count(&self, kind: NodeKind) -> usize {
        self.nodes_by_kind
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |(_, count)| *count)
    }

    pub fn total_nodes(&self) -> usize {
        self.nodes_by_kind.iter().map(|(_, count)| count).sum()
    }
}

/// Immutable layout of a constraint network, built once per constraint set.
///
/// Nodes are deduplicated: one for-each node per fact type, and one node
/// per stream definition no matter how many constraints extend it. Nodes
/// are ordered by layer (longest path from a for-each source), so every
/// node sits after all of its parents.
pub struct NetworkTemplate<Sc: Score> {
    topology: Arc<Topology>,
    sources: Vec<&'static str>,
    nodes: Vec<Arc<StreamDef>>,
    scorers: Vec<ScorerSpec<Sc>>,
    stats: NetworkStats,
}

struct Builder {
    sources: Vec<SourceSpec>,
    source_by_type: HashMap<TypeId, usize>,
    nodes: Vec<NodeSpec>,
    by_def: HashMap<*const StreamDef, usize>,
    shared: usize,
}

impl Builder {
    fn new() -> Self {
        Self {
            sources: Vec::new(),
            source_by_type: HashMap::new(),
            nodes: Vec::new(),
            by_def: HashMap::new(),
            shared: 0,
        }
    }

    fn layer(&self, producer: Producer) -> usize {
        match producer {
            Producer::Source(_) => 0,
            Producer::Node(index) => self.nodes[index].layer,
        }
    }

    fn children_mut(&mut self, producer: Producer) -> &mut Vec<Target> {
        match producer {
            Producer::Source(index) => &mut self.sources[index].children,
            Producer::Node(index) => &mut self.nodes[index].children,
        }
    }

    fn visit(&mut self, def: &Arc<StreamDef>) -> Producer {
        if let StreamKind::ForEach { type_id, type_name } = def.kind {
            if let Some(&index) = self.source_by_type.get(&type_id) {
                self.shared += 1;
                return Producer::Source(index);
            }
            self.sources.push(SourceSpec {
                type_name,
                children: Vec::new(),
            });
            let index = self.sources.len() - 1;
            self.source_by_type.insert(type_id, index);
            return Producer::Source(index);
        }

        if let Some(&index) = self.by_def.get(&Arc::as_ptr(def)) {
            self.shared += 1;
            return Producer::Node(index);
        }

        let parents: Vec<Producer> = def.parents.iter().map(|parent| self.visit(parent)).collect();
        let layer = 1 + parents
            .iter()
            .map(|&parent| self.layer(parent))
            .max()
            .unwrap_or(0);
        self.nodes.push(NodeSpec {
            def: def.clone(),
            layer,
            children: Vec::new(),
        });
        let index = self.nodes.len() - 1;
        for (parent, port) in parents.into_iter().zip([Port::Left, Port::Right]) {
            self.children_mut(parent).push(Target::Node { index, port });
        }
        self.by_def.insert(Arc::as_ptr(def), index);
        Producer::Node(index)
    }

    /// Reorders nodes by layer, keeping discovery order within a layer.
    fn sort_by_layer(&mut self) {
        let mut order: Vec<usize> = (0..self.nodes.len()).collect();
        order.sort_by_key(|&index| self.nodes[index].layer);
        let mut remap = vec![0; order.len()];
        for (new, &old) in order.iter().enumerate() {
            remap[old] = new;
        }
        let retarget = |targets: &mut Vec<Target>| {
            for target in targets.iter_mut() {
                if let Target::Node { index, .. } = target {
                    *index = remap[*index];
                }
            }
        };
        for source in &mut self.sources {
            retarget(&mut source.children);
        }
        for node in &mut self.nodes {
            retarget(&mut node.children);
        }
        let mut slots: Vec<Option<NodeSpec>> = self.nodes.drain(..).map(Some).collect();
        self.nodes = order
            .iter()
            .filter_map(|&old| slots[old].take())
            .collect();
        self.by_def.clear();
    }
}

impl<Sc: Score> NetworkTemplate<Sc> {
    pub fn build(constraints: Vec<Constraint<Sc>>) -> Result<Self> {
        Self::build_with_overrides(constraints, &ConstraintWeightOverrides::new())
    }

    /// Compiles the constraints, applying weight overrides by full name.
    ///
    /// # Errors
    /// [`ScoreForgeError::Config`] on duplicate constraint names, on an
    /// override naming no constraint, and on an override of a constraint
    /// that computes its own score.
    pub fn build_with_overrides(
        constraints: Vec<Constraint<Sc>>,
        overrides: &ConstraintWeightOverrides<Sc>,
    ) -> Result<Self> {
        let mut names = HashSet::with_capacity(constraints.len());
        for constraint in &constraints {
            if !names.insert(constraint.constraint_ref.full_name()) {
                return Err(ScoreForgeError::Config(format!(
                    "Duplicate constraint name '{}'",
                    constraint.constraint_ref
                )));
            }
        }
        if let Some(unknown) = overrides.names().into_iter().find(|name| !names.contains(*name)) {
            return Err(ScoreForgeError::Config(format!(
                "Weight override for unknown constraint '{}'",
                unknown
            )));
        }

        let mut builder = Builder::new();
        let mut scorers = Vec::with_capacity(constraints.len());
        let mut disabled = 0;
        for constraint in constraints {
            let full_name = constraint.constraint_ref.full_name();
            let impact = match overrides.get(&full_name) {
                None => constraint.impact,
                Some(weight) if weight.is_zero() => {
                    debug!(
                        event = "constraint_disabled",
                        constraint = %constraint.constraint_ref,
                    );
                    disabled += 1;
                    continue;
                }
                Some(weight) => constraint.impact.reweighted(weight).ok_or_else(|| {
                    ScoreForgeError::Config(format!(
                        "Constraint '{}' computes its own score and cannot take a weight override",
                        constraint.constraint_ref
                    ))
                })?,
            };
            let producer = builder.visit(&constraint.stream);
            builder
                .children_mut(producer)
                .push(Target::Scorer(scorers.len()));
            scorers.push(ScorerSpec {
                constraint_ref: constraint.constraint_ref,
                impact_type: constraint.impact_type,
                impact,
            });
        }
        builder.sort_by_layer();

        let mut nodes_by_kind: Vec<(NodeKind, usize)> = Vec::new();
        let mut tally = |kind: NodeKind, count: usize| {
            if count == 0 {
                return;
            }
            match nodes_by_kind.iter_mut().find(|(k, _)| *k == kind) {
                Some((_, total)) => *total += count,
                None => nodes_by_kind.push((kind, count)),
            }
        };
        tally(NodeKind::ForEach, builder.sources.len());
        for node in &builder.nodes {
            tally(node.def.node_kind(), 1);
        }
        tally(NodeKind::Scorer, scorers.len());
        nodes_by_kind.sort();
        let stats = NetworkStats {
            nodes_by_kind,
            shared_nodes: builder.shared,
            constraints: scorers.len(),
            disabled_constraints: disabled,
        };

        info!(
            event = "network_built",
            constraints = stats.constraints,
            disabled = stats.disabled_constraints,
            nodes = stats.total_nodes(),
            shared = stats.shared_nodes,
            layers = builder.nodes.last().map_or(0, |node| node.layer),
        );

        let topology = Topology {
            source_by_type: builder.source_by_type,
            source_children: builder
                .sources
                .iter()
                .map(|source| source.children.clone())
                .collect(),
            node_children: builder
                .nodes
                .iter()
                .map(|node| node.children.clone())
                .collect(),
        };
        Ok(Self {
            topology: Arc::new(topology),
            sources: builder.sources.iter().map(|source| source.type_name).collect(),
            nodes: builder.nodes.into_iter().map(|node| node.def).collect(),
            scorers,
            stats,
        })
    }

    /// A fresh live network with no facts inserted.
    pub fn instantiate(&self, track_matches: bool) -> ConstraintSession<Sc> {
        let sources = self
            .sources
            .iter()
            .map(|&type_name| ForEachNode::new(type_name))
            .collect();
        let nodes: Vec<Box<dyn Node>> = self
            .nodes
            .iter()
            .filter_map(|def| def.instantiate())
            .collect();
        let scorers = self
            .scorers
            .iter()
            .map(|spec| {
                Scorer::new(
                    spec.constraint_ref.clone(),
                    spec.impact_type,
                    spec.impact.clone(),
                    track_matches,
                )
            })
            .collect();
        ConstraintSession::new(self.topology.clone(), sources, nodes, scorers)
    }

    pub fn stats(&self) -> &NetworkStats {
        &self.stats
    }

    pub fn constraint_count(&self) -> usize {
        self.scorers.len()
    }

    pub fn constraint_refs(&self) -> impl Iterator<Item = &ConstraintRef> + '_ {
        self.scorers.iter().map(|spec| &spec.constraint_ref)
    }

    /// True if some constraint reads facts of the type.
    pub fn uses_type(&self, type_id: TypeId) -> bool {
        self.topology.source_by_type.contains_key(&type_id)
    }
}

impl<Sc: Score> fmt::Debug for NetworkTemplate<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkTemplate")
            .field("sources", &self.sources)
            .field("stats", &self.stats)
            .finish()
    }
}
