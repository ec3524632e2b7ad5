//! Search configuration from TOML (`[search]` section)

use oracle_application::config::DEFAULT_SEARCH_TIMEOUT_SECS;
use serde::{Deserialize, Serialize};

/// Browser-like user agent sent to search engines.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Raw search configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSearchConfig {
    /// Result pages fetched per query
    pub pages: usize,
    /// Timeout in seconds for one search
    pub timeout_seconds: u64,
    /// User-Agent header for result page requests
    pub user_agent: String,
}

impl Default for FileSearchConfig {
    fn default() -> Self {
        Self {
            pages: 2,
            timeout_seconds: DEFAULT_SEARCH_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
