//! Score director factory sharing one compiled network.

use std::sync::Arc;

use scoreforge_config::ScoreDirectorConfig;
use scoreforge_core::{ParseableScore, Result, Score};

use super::simple::SimpleScoreDirector;
use super::stream::StreamScoreDirector;
use crate::api::ConstraintWeightOverrides;
use crate::fact::Facts;
use crate::network::NetworkTemplate;
use crate::stream::{ConstraintFactory, ConstraintProvider};

/// Builds score directors over one shared [`NetworkTemplate`].
///
/// The template is compiled once; every director gets its own session, so
/// directors built here can run on separate threads.
pub struct ScoreDirectorFactory<Sc: Score> {
    template: Arc<NetworkTemplate<Sc>>,
    config: ScoreDirectorConfig,
}

impl<Sc: Score> ScoreDirectorFactory<Sc> {
    pub fn new(template: NetworkTemplate<Sc>) -> Self {
        Self {
            template: Arc::new(template),
            config: ScoreDirectorConfig::default(),
        }
    }

    /// Uses the environment mode and match tracking of `config` for every
    /// director built afterwards. Weight overrides in `config` are ignored
    /// here; compile them in with [`from_provider`](Self::from_provider).
    pub fn with_config(mut self, config: ScoreDirectorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build_score_director(&self, facts: Facts) -> Result<StreamScoreDirector<Sc>> {
        StreamScoreDirector::with_config(self.template.clone(), facts, &self.config)
    }

    pub fn build_simple_score_director(&self, facts: Facts) -> SimpleScoreDirector<Sc> {
        SimpleScoreDirector::new(self.template.clone(), facts)
            .with_match_tracking(self.config.constraint_match_enabled)
    }

    pub fn template(&self) -> &Arc<NetworkTemplate<Sc>> {
        &self.template
    }

    pub fn config(&self) -> &ScoreDirectorConfig {
        &self.config
    }
}

impl<Sc: ParseableScore> ScoreDirectorFactory<Sc> {
    /// Compiles the provider's constraints with the weight overrides of
    /// `config`.
    pub fn from_provider<P>(provider: &P, config: ScoreDirectorConfig) -> Result<Self>
    where
        P: ConstraintProvider<Sc> + ?Sized,
    {
        let overrides = ConstraintWeightOverrides::from_config(&config)?;
        let constraints = provider.define_constraints(&ConstraintFactory::new());
        let template = NetworkTemplate::build_with_overrides(constraints, &overrides)?;
        Ok(Self {
            template: Arc::new(template),
            config,
        })
    }
}

impl<Sc: Score> Clone for ScoreDirectorFactory<Sc> {
    fn clone(&self) -> Self {
        Self {
            template: self.template.clone(),
            config: self.config.clone(),
        }
    }
}
