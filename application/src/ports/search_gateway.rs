//! Web search port

use async_trait::async_trait;
use oracle_domain::{SearchEngine, SearchResult};
use thiserror::Error;

/// Errors that can occur while querying a search engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("{engine} refused the request (HTTP {status})")]
    Rejected { engine: SearchEngine, status: u16 },

    #[error("{0} is rate limiting requests")]
    RateLimited(SearchEngine),

    #[error("Could not read results page: {0}")]
    ParseError(String),

    #[error("Timeout")]
    Timeout,
}

/// Gateway for web search
///
/// Returns results in the engine's own ranking order. Finding nothing is an
/// empty `Vec`, not an error.
#[async_trait]
pub trait SearchGateway: Send + Sync {
    async fn search(
        &self,
        query: &str,
        engine: SearchEngine,
    ) -> Result<Vec<SearchResult>, SearchError>;
}

/// Search gateway for sessions that never search.
pub struct NoSearch;

#[async_trait]
impl SearchGateway for NoSearch {
    async fn search(
        &self,
        _query: &str,
        _engine: SearchEngine,
    ) -> Result<Vec<SearchResult>, SearchError> {
        Ok(Vec::new())
    }
}
