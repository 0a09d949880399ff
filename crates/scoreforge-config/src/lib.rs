//! Configuration system for ScoreForge.
//!
//! Load score director configuration from TOML or YAML to switch
//! assertion modes, constraint-match tracking and constraint weights
//! without code changes.
//!
//! # Examples
//!
//! ```
//! use scoreforge_config::{EnvironmentMode, ScoreDirectorConfig};
//! use scoreforge_core::HardSoftScore;
//!
//! let config = ScoreDirectorConfig::from_toml_str(r#"
//!     environment_mode = "full_assert"
//!     constraint_match_enabled = true
//!
//!     [constraint_weights]
//!     "Room conflict" = "-2hard/0soft"
//! "#).unwrap();
//!
//! assert_eq!(config.environment_mode, EnvironmentMode::FullAssert);
//! assert_eq!(
//!     config.constraint_weight::<HardSoftScore>("Room conflict").unwrap(),
//!     Some(HardSoftScore::of(-2, 0))
//! );
//! ```
//!
//! Use the default config when the file is missing:
//!
//! ```
//! use scoreforge_config::ScoreDirectorConfig;
//!
//! let config = ScoreDirectorConfig::load("scoring.toml").unwrap_or_default();
//! assert!(!config.constraint_match_enabled);
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use scoreforge_core::ParseableScore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Score director configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ScoreDirectorConfig {
    /// Environment mode controlling runtime assertions.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Keep per-match justifications for score explanation and indictments.
    #[serde(default)]
    pub constraint_match_enabled: bool,

    /// Constraint weight overrides, keyed by constraint full name, values in
    /// the score's string form (for example `"-1hard/0soft"`).
    #[serde(default)]
    pub constraint_weights: BTreeMap<String, String>,
}

impl ScoreDirectorConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file, choosing YAML for `.yaml`/`.yml`
    /// and TOML otherwise.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the environment mode.
    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    /// Enables or disables constraint match tracking.
    pub fn with_constraint_match_enabled(mut self, enabled: bool) -> Self {
        self.constraint_match_enabled = enabled;
        self
    }

    /// Adds a constraint weight override in string form.
    pub fn with_constraint_weight(
        mut self,
        constraint: impl Into<String>,
        weight: impl Into<String>,
    ) -> Self {
        self.constraint_weights
            .insert(constraint.into(), weight.into());
        self
    }

    /// Parses the weight override for one constraint, if configured.
    pub fn constraint_weight<Sc: ParseableScore>(
        &self,
        constraint: &str,
    ) -> Result<Option<Sc>, ConfigError> {
        self.constraint_weights
            .get(constraint)
            .map(|raw| parse_weight(constraint, raw))
            .transpose()
    }

    /// Parses every weight override.
    pub fn parsed_constraint_weights<Sc: ParseableScore>(
        &self,
    ) -> Result<Vec<(String, Sc)>, ConfigError> {
        self.constraint_weights
            .iter()
            .map(|(name, raw)| Ok((name.clone(), parse_weight(name, raw)?)))
            .collect()
    }
}

fn parse_weight<Sc: ParseableScore>(constraint: &str, raw: &str) -> Result<Sc, ConfigError> {
    Sc::parse(raw).map_err(|e| {
        ConfigError::Invalid(format!("weight for constraint '{}': {}", constraint, e))
    })
}

/// Environment mode affecting runtime assertions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// No assertions.
    #[default]
    NonReproducible,

    /// No assertions; propagation order is always deterministic.
    Reproducible,

    /// Check node and accumulator invariants after every flush.
    FastAssert,

    /// Also recompute every score from scratch and compare.
    FullAssert,
}

impl EnvironmentMode {
    /// Returns true if quiescence invariants are checked after each flush.
    pub fn is_asserted(&self) -> bool {
        matches!(self, EnvironmentMode::FastAssert | EnvironmentMode::FullAssert)
    }

    /// Returns true if scores are recomputed from scratch for comparison.
    pub fn is_fully_asserted(&self) -> bool {
        matches!(self, EnvironmentMode::FullAssert)
    }
}
