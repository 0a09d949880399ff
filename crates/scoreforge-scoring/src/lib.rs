//! Incremental constraint scoring for ScoreForge.
//!
//! This crate turns declarative constraint streams into a live dataflow
//! network and keeps a score up to date as facts are inserted, changed
//! and removed:
//! - Fluent constraint streams (`ConstraintFactory`, `UniConstraintStream`, ...)
//! - Compiled, shareable networks (`NetworkTemplate`) and their live
//!   instances (`ConstraintSession`)
//! - Score directors owning the working facts (`StreamScoreDirector`,
//!   `SimpleScoreDirector`)
//! - Score explanation and indictments
//!
//! # Architecture
//!
//! Facts live in a generational [`Facts`] store and are referenced by
//! [`FactId`] everywhere else. Each node owns the tuples it produces;
//! changes travel downstream as slot-addressed insert, update and retract
//! signals, settled layer by layer on every flush.

// Type-erased stream functions are spelled out in full
#![allow(clippy::type_complexity)]

// Core modules
pub mod api;
pub mod director;
pub mod error;
pub mod fact;
pub(crate) mod index;
pub mod network;
pub(crate) mod node;
pub mod stream;
pub mod tuple;

#[cfg(test)]
mod fixtures;

// ============================================================================
// Facts
// ============================================================================

pub use fact::{Fact, FactHandle, FactId, Facts};
pub use tuple::{Element, TupleView, Value};

// ============================================================================
// Fluent Constraint Stream API
// ============================================================================

pub use stream::collector;
pub use stream::joiner;
pub use stream::{
    BiConstraintStream, Constraint, ConstraintBuilder, ConstraintFactory, ConstraintProvider,
    QuadConstraintStream, TriConstraintStream, UniConstraintStream,
};

// ============================================================================
// Networks
// ============================================================================

pub use network::{ConstraintSession, NetworkStats, NetworkTemplate};
pub use node::NodeKind;

// ============================================================================
// Score Directors
// ============================================================================

pub use director::{ScoreDirector, ScoreDirectorFactory, SimpleScoreDirector, StreamScoreDirector};

// ============================================================================
// Analysis (for score explanation)
// ============================================================================

pub use api::analysis::{
    ConstraintAnalysis, ConstraintJustification, ConstraintMatch, ConstraintMatchTotal, FactRef,
    Indictment, IndictmentMap, ScoreExplanation,
};
pub use api::weight_overrides::ConstraintWeightOverrides;

/// Everything needed to define constraints and score facts.
pub mod prelude {
    pub use crate::collector;
    pub use crate::joiner;
    pub use crate::{
        BiConstraintStream, Constraint, ConstraintFactory, ConstraintProvider, FactHandle, FactId,
        Facts, NetworkTemplate, QuadConstraintStream, ScoreDirector, SimpleScoreDirector,
        StreamScoreDirector, TriConstraintStream, UniConstraintStream,
    };
}
