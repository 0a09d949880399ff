//! Finished constraints and the builder that names them.

use std::fmt;
use std::sync::Arc;

use scoreforge_core::{ConstraintRef, ImpactType, Score};

use super::def::StreamDef;
use crate::node::Impact;

/// A stream with its impact chosen, waiting for a name.
pub struct ConstraintBuilder<Sc: Score> {
    stream: Arc<StreamDef>,
    impact_type: ImpactType,
    impact: Impact<Sc>,
}

impl<Sc: Score> ConstraintBuilder<Sc> {
    pub(crate) fn new(stream: Arc<StreamDef>, impact_type: ImpactType, impact: Impact<Sc>) -> Self {
        Self {
            stream,
            impact_type,
            impact,
        }
    }

    /// Finishes the constraint in the default (empty) package.
    pub fn as_constraint(self, name: impl Into<String>) -> Constraint<Sc> {
        self.as_constraint_in("", name)
    }

    pub fn as_constraint_in(
        self,
        package: impl Into<String>,
        name: impl Into<String>,
    ) -> Constraint<Sc> {
        Constraint {
            constraint_ref: ConstraintRef::new(package, name),
            impact_type: self.impact_type,
            stream: self.stream,
            impact: self.impact,
        }
    }
}

/// A named constraint definition, ready to be compiled into a network.
pub struct Constraint<Sc: Score> {
    pub(crate) constraint_ref: ConstraintRef,
    pub(crate) impact_type: ImpactType,
    pub(crate) stream: Arc<StreamDef>,
    pub(crate) impact: Impact<Sc>,
}

impl<Sc: Score> Constraint<Sc> {
    pub fn constraint_ref(&self) -> &ConstraintRef {
        &self.constraint_ref
    }

    pub fn name(&self) -> &str {
        &self.constraint_ref.name
    }

    pub fn impact_type(&self) -> ImpactType {
        self.impact_type
    }

    /// The constant weight, `None` when each match computes its own score.
    pub fn weight(&self) -> Option<Sc> {
        self.impact.weight()
    }

    /// True if the weight touches the first (hard) score level.
    pub fn is_hard(&self) -> bool {
        self.weight()
            .and_then(|weight| weight.to_level_numbers().first().copied())
            .is_some_and(|hard| hard != 0)
    }
}

impl<Sc: Score> Clone for Constraint<Sc> {
    fn clone(&self) -> Self {
        Self {
            constraint_ref: self.constraint_ref.clone(),
            impact_type: self.impact_type,
            stream: self.stream.clone(),
            impact: self.impact.clone(),
        }
    }
}

impl<Sc: Score> fmt::Debug for Constraint<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("name", &self.constraint_ref.full_name())
            .field("impact_type", &self.impact_type)
            .field("weight", &self.weight())
            .field("arity", &self.stream.arity)
            .finish()
    }
}
