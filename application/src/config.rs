//! Application-level configuration.
//!
//! This module provides configuration types that control how the Oracle
//! drives its collaborators, such as call timeouts and retry policies.

use std::time::Duration;

/// Default wall-clock limit for a single model call.
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 120;

/// Default wall-clock limit for a single search request.
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 30;

/// Application behavior configuration.
///
/// Controls runtime behavior of the pipeline: how long a model or search
/// call may take and how many times a failed call is retried before the
/// pipeline degrades.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BehaviorConfig {
    /// Maximum time to wait for a model response. `None` waits forever.
    pub model_timeout: Option<Duration>,
    /// Maximum time to wait for a search engine. `None` waits forever.
    pub search_timeout: Option<Duration>,
    /// Extra attempts after a failed call.
    pub max_retries: u32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            model_timeout: Some(Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECS)),
            search_timeout: Some(Duration::from_secs(DEFAULT_SEARCH_TIMEOUT_SECS)),
            max_retries: 1,
        }
    }
}

impl BehaviorConfig {
    /// Creates a BehaviorConfig from optional timeouts in seconds.
    ///
    /// A `None` timeout is not applied.
    pub fn from_timeout_seconds(model: Option<u64>, search: Option<u64>) -> Self {
        Self {
            model_timeout: model.map(Duration::from_secs),
            search_timeout: search.map(Duration::from_secs),
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Total number of attempts a call gets.
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}
