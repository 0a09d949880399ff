//! ScoreForge - incremental constraint scoring
//!
//! Constraints are written as streams over plain Rust facts, compiled once
//! into a shared network, and scored incrementally as facts change.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use scoreforge::prelude::*;
//!
//! #[derive(Clone, Debug)]
//! struct Lesson { room: u32, start: i64, end: i64 }
//!
//! let constraints = vec![ConstraintFactory::new()
//!     .for_each_unique_pair(joiner::equal(|l: &Lesson| l.room).and(joiner::overlapping(
//!         |l: &Lesson| l.start,
//!         |l: &Lesson| l.end,
//!         |l: &Lesson| l.start,
//!         |l: &Lesson| l.end,
//!     )))
//!     .penalize(HardSoftScore::of_hard(1))
//!     .as_constraint("Room conflict")];
//!
//! let template = Arc::new(NetworkTemplate::build(constraints).unwrap());
//! let mut director = StreamScoreDirector::new(template, Facts::new()).unwrap();
//! director.add_fact(Lesson { room: 1, start: 0, end: 60 }).unwrap();
//! let late = director.add_fact(Lesson { room: 1, start: 30, end: 90 }).unwrap();
//! assert_eq!(director.calculate_score().unwrap(), HardSoftScore::of_hard(-1));
//!
//! director.change_fact(late, |l| l.room = 2).unwrap();
//! assert_eq!(director.calculate_score().unwrap(), HardSoftScore::ZERO);
//! ```

// Score types
pub use scoreforge_core::{
    BendableScore, ConstraintRef, HardMediumSoftScore, HardSoftScore, ImpactType, ParseableScore,
    Result, Score, ScoreForgeError, SimpleScore,
};

// Constraint stream API
pub use scoreforge_scoring::stream;
pub use scoreforge_scoring::{
    Constraint, ConstraintFactory, ConstraintProvider, Fact, FactHandle, FactId, Facts,
    NetworkStats, NetworkTemplate, NodeKind,
};

// Score directors and analysis
pub use scoreforge_scoring::{
    ConstraintAnalysis, ConstraintMatchTotal, ConstraintWeightOverrides, IndictmentMap,
    ScoreDirector, ScoreDirectorFactory, ScoreExplanation, SimpleScoreDirector,
    StreamScoreDirector,
};

// Configuration
pub use scoreforge_config::{ConfigError, EnvironmentMode, ScoreDirectorConfig};

pub mod prelude {
    pub use super::stream::{collector, joiner};
    pub use super::{
        BendableScore, HardMediumSoftScore, HardSoftScore, Score, SimpleScore,
    };
    pub use super::{
        ConstraintFactory, ConstraintProvider, EnvironmentMode, FactHandle, Facts,
        NetworkTemplate, ScoreDirector, ScoreDirectorConfig, ScoreDirectorFactory,
        StreamScoreDirector,
    };
}
