//! Error types for ScoreForge

use thiserror::Error;

/// Main error type for ScoreForge operations.
///
/// None of these are transient: the engine does no I/O, so every error
/// means either a broken constraint definition or a broken caller.
#[derive(Debug, Error)]
pub enum ScoreForgeError {
    /// Malformed constraint network or configuration, detected before scoring starts.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A fact was updated or retracted that the network never saw.
    #[error("Unknown fact: {0}")]
    UnknownFact(String),

    /// A fact identity was inserted twice.
    #[error("Duplicate fact: {0}")]
    DuplicateFact(String),

    /// The incremental score diverged from a from-scratch recalculation.
    #[error("Score corruption: {0}")]
    ScoreCorruption(String),

    /// Internal invariant broken.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl ScoreForgeError {
    /// Returns true for errors caused by misuse of the fact protocol.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            ScoreForgeError::UnknownFact(_) | ScoreForgeError::DuplicateFact(_)
        )
    }
}

/// Result type alias for ScoreForge operations
pub type Result<T> = std::result::Result<T, ScoreForgeError>;
