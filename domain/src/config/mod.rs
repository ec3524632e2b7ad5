//! Configuration value objects for the domain layer
//!
//! These are domain concepts related to configuration that are
//! used across multiple layers.

mod error;
mod oracle_config;
mod output_format;
mod provider;
mod search_engine;

pub use error::ConfigError;
pub use oracle_config::OracleConfig;
pub use output_format::OutputFormat;
pub use provider::ProviderKind;
pub use search_engine::SearchEngine;
