//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod behavior;
mod logging;
mod oracle;
mod output;
mod providers;
mod repl;
mod search;

pub use behavior::FileBehaviorConfig;
pub use logging::FileLoggingConfig;
pub use oracle::FileOracleConfig;
pub use output::FileOutputConfig;
pub use providers::{
    DEFAULT_LM_STUDIO_KEY, FileOllamaConfig, FileOpenAiCompatibleConfig, FileProvidersConfig,
};
pub use repl::FileReplConfig;
pub use search::{DEFAULT_USER_AGENT, FileSearchConfig};

use oracle_domain::ConfigError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("search.pages must be at least 1")]
    ZeroPages,

    #[error("model name cannot be empty")]
    EmptyModelName,

    #[error("invalid [oracle] section: {0}")]
    InvalidOracle(#[from] ConfigError),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Session defaults: model, provider, search engine
    pub oracle: FileOracleConfig,
    /// Model endpoint settings
    pub providers: FileProvidersConfig,
    /// Search scraping settings
    pub search: FileSearchConfig,
    /// Timeouts and retries
    pub behavior: FileBehaviorConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// REPL settings
    pub repl: FileReplConfig,
    /// Transcript logging
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.behavior.timeout_seconds == Some(0) || self.search.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.search.pages == 0 {
            return Err(ConfigValidationError::ZeroPages);
        }
        if let Some(model) = &self.oracle.model
            && model.trim().is_empty()
        {
            return Err(ConfigValidationError::EmptyModelName);
        }
        self.oracle.to_oracle_config()?;
        Ok(())
    }
}
