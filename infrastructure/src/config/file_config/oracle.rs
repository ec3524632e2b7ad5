//! Session defaults from TOML (`[oracle]` section)

use oracle_domain::{ConfigError, OracleConfig};
use serde::{Deserialize, Serialize};

/// Raw Oracle configuration from TOML
///
/// Values are kept as strings so a bad name surfaces as a validation
/// error instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOracleConfig {
    /// Model name (default: llama3.2)
    pub model: Option<String>,
    /// "ollama" or "lm_studio"
    pub provider: Option<String>,
    /// Search engine; absent means search is off
    pub search_engine: Option<String>,
}

impl FileOracleConfig {
    /// Build the session configuration, filling unset fields with defaults.
    pub fn to_oracle_config(&self) -> Result<OracleConfig, ConfigError> {
        let defaults = OracleConfig::default();
        let model = match &self.model {
            Some(name) => name.parse()?,
            None => defaults.model,
        };
        let provider = match &self.provider {
            Some(name) => name.parse()?,
            None => defaults.provider,
        };
        let config = OracleConfig::new(model, provider);
        match &self.search_engine {
            Some(engine) => Ok(config.with_search(engine.parse()?)),
            None => Ok(config),
        }
    }
}
