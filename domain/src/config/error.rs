//! Configuration errors

use super::provider::ProviderKind;
use thiserror::Error;

/// Errors raised when an [`OracleConfig`](super::OracleConfig) is built or applied.
///
/// These are always reported eagerly, before any pipeline run starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("model name cannot be empty")]
    EmptyModelName,

    #[error("unknown provider: {0} (expected 'ollama' or 'lm_studio')")]
    UnknownProvider(String),

    #[error("unknown search engine: {0} (expected google, bing, yahoo, duckduckgo or brave)")]
    UnknownSearchEngine(String),

    #[error("search is enabled but no search engine is configured")]
    MissingSearchEngine,

    #[error("no model gateway registered for provider '{0}'")]
    ProviderUnavailable(ProviderKind),
}
