//! Search gateway that scrapes engine result pages

use super::engines::EngineProfile;
use crate::config::FileSearchConfig;
use async_trait::async_trait;
use oracle_application::{SearchError, SearchGateway};
use oracle_domain::{SearchEngine, SearchResult};
use reqwest::Url;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, warn};

/// TCP connection timeout for search engines.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetches and parses HTML result pages from public search engines.
pub struct ScraperSearchGateway {
    client: reqwest::Client,
    pages: usize,
    user_agent: String,
    endpoints: HashMap<SearchEngine, String>,
}

impl ScraperSearchGateway {
    pub fn new(pages: usize, user_agent: impl Into<String>) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| {
                SearchError::ConnectionError(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            pages: pages.max(1),
            user_agent: user_agent.into(),
            endpoints: HashMap::new(),
        })
    }

    pub fn from_config(config: &FileSearchConfig) -> Result<Self, SearchError> {
        Self::new(config.pages, &config.user_agent)
    }

    /// Send `engine`'s queries to `url` instead of its public endpoint.
    pub fn with_endpoint(mut self, engine: SearchEngine, url: impl Into<String>) -> Self {
        self.endpoints.insert(engine, url.into());
        self
    }

    fn endpoint(&self, engine: SearchEngine, profile: &EngineProfile) -> &str {
        self.endpoints
            .get(&engine)
            .map(String::as_str)
            .unwrap_or(profile.endpoint)
    }

    async fn fetch_page(
        &self,
        engine: SearchEngine,
        profile: &EngineProfile,
        query: &str,
        page: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let endpoint = self.endpoint(engine, profile);
        let page_value = profile.page_value(page);
        let mut params = vec![(profile.query_param, query)];
        if page > 0 {
            params.push((profile.page_param, page_value.as_str()));
        }

        let url = Url::parse_with_params(endpoint, &params)
            .map_err(|e| SearchError::ParseError(format!("bad endpoint {}: {}", endpoint, e)))?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else {
                    SearchError::ConnectionError(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(SearchError::RateLimited(engine));
        }
        if !status.is_success() {
            return Err(SearchError::Rejected {
                engine,
                status: status.as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;

        profile.parse_results(&url, &html)
    }
}

#[async_trait]
impl SearchGateway for ScraperSearchGateway {
    async fn search(
        &self,
        query: &str,
        engine: SearchEngine,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let profile = EngineProfile::for_engine(engine);
        let mut results: Vec<SearchResult> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for page in 0..self.pages {
            let page_results = match self.fetch_page(engine, &profile, query, page).await {
                Ok(r) => r,
                // Later pages are a bonus; keep what the first ones gave
                Err(e) if page > 0 => {
                    warn!(
                        "{} page {} failed, keeping {} results: {}",
                        engine,
                        page + 1,
                        results.len(),
                        e
                    );
                    break;
                }
                Err(e) => return Err(e),
            };

            if page_results.is_empty() {
                break;
            }
            results.extend(
                page_results
                    .into_iter()
                    .filter(|r| seen.insert(r.url.clone())),
            );
        }

        debug!("{} returned {} results for '{}'", engine, results.len(), query);
        Ok(results)
    }
}
