//! Search engine value object

use super::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Web search engine used for evidence gathering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    Google,
    Bing,
    Yahoo,
    #[serde(alias = "ddg")]
    DuckDuckGo,
    Brave,
}

impl SearchEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchEngine::Google => "google",
            SearchEngine::Bing => "bing",
            SearchEngine::Yahoo => "yahoo",
            SearchEngine::DuckDuckGo => "duckduckgo",
            SearchEngine::Brave => "brave",
        }
    }

    pub fn all() -> &'static [SearchEngine] {
        &[
            SearchEngine::Google,
            SearchEngine::Bing,
            SearchEngine::Yahoo,
            SearchEngine::DuckDuckGo,
            SearchEngine::Brave,
        ]
    }
}

impl std::fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SearchEngine {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(SearchEngine::Google),
            "bing" => Ok(SearchEngine::Bing),
            "yahoo" => Ok(SearchEngine::Yahoo),
            "duckduckgo" | "ddg" => Ok(SearchEngine::DuckDuckGo),
            "brave" => Ok(SearchEngine::Brave),
            other => Err(ConfigError::UnknownSearchEngine(other.to_string())),
        }
    }
}
