//! Error helpers shared by the network internals.

pub use scoreforge_core::{Result, ScoreForgeError};

/// An internal invariant of the network broke.
pub(crate) fn impossible(detail: impl std::fmt::Display) -> ScoreForgeError {
    ScoreForgeError::InvalidState(format!("Impossible state: {}", detail))
}
