//! Oracle configuration value object

use super::error::ConfigError;
use super::provider::ProviderKind;
use super::search_engine::SearchEngine;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// Configuration of one Oracle session.
///
/// Immutable for the duration of a pipeline run. Changing it means building
/// a new value and handing it to `Oracle::configure`, which swaps it in whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    pub model: Model,
    pub provider: ProviderKind,
    pub search_engine: Option<SearchEngine>,
    pub search_enabled: bool,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self::new(Model::default(), ProviderKind::default())
    }
}

impl OracleConfig {
    /// Search is disabled until an engine is attached with [`with_search`](Self::with_search).
    pub fn new(model: Model, provider: ProviderKind) -> Self {
        Self {
            model,
            provider,
            search_engine: None,
            search_enabled: false,
        }
    }

    /// Build a configuration from user-facing strings (CLI flags, REPL commands).
    pub fn parse(
        model: &str,
        provider: &str,
        search_engine: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let config = Self::new(model.parse()?, provider.parse()?);
        match search_engine {
            Some(engine) => Ok(config.with_search(engine.parse()?)),
            None => Ok(config),
        }
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_search(mut self, engine: SearchEngine) -> Self {
        self.search_engine = Some(engine);
        self.search_enabled = true;
        self
    }

    pub fn without_search(mut self) -> Self {
        self.search_engine = None;
        self.search_enabled = false;
        self
    }

    /// The engine to use, if search is both enabled and configured.
    pub fn active_search_engine(&self) -> Option<SearchEngine> {
        if self.search_enabled {
            self.search_engine
        } else {
            None
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.as_str().trim().is_empty() {
            return Err(ConfigError::EmptyModelName);
        }
        if self.search_enabled && self.search_engine.is_none() {
            return Err(ConfigError::MissingSearchEngine);
        }
        Ok(())
    }
}
