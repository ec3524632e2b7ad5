//! Behavior configuration from TOML (`[behavior]` section)

use oracle_application::BehaviorConfig;
use oracle_application::config::DEFAULT_MODEL_TIMEOUT_SECS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw behavior configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBehaviorConfig {
    /// Timeout in seconds for each model call
    pub timeout_seconds: Option<u64>,
    /// Extra attempts after a failed model or search call
    pub max_retries: u32,
}

impl Default for FileBehaviorConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: Some(DEFAULT_MODEL_TIMEOUT_SECS),
            max_retries: 1,
        }
    }
}

impl FileBehaviorConfig {
    /// Combine with the search timeout into the application's behavior settings.
    pub fn to_behavior_config(&self, search_timeout_seconds: u64) -> BehaviorConfig {
        BehaviorConfig {
            model_timeout: self.timeout_seconds.map(Duration::from_secs),
            search_timeout: Some(Duration::from_secs(search_timeout_seconds)),
            max_retries: self.max_retries,
        }
    }
}
