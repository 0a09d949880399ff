//! Analysis types and runtime weight overrides.

pub mod analysis;
pub mod weight_overrides;

#[cfg(test)]
mod analysis_tests;

pub use analysis::{
    ConstraintAnalysis, ConstraintJustification, ConstraintMatch, ConstraintMatchTotal, FactRef,
    Indictment, IndictmentMap, ScoreExplanation,
};
pub use weight_overrides::ConstraintWeightOverrides;
