//! Web search adapters
//!
//! [`ScraperSearchGateway`] implements the
//! [`SearchGateway`](oracle_application::SearchGateway) port by fetching
//! public result pages and reading them with CSS selectors.

pub mod engines;
mod scraper_gateway;

pub use engines::EngineProfile;
pub use scraper_gateway::ScraperSearchGateway;
