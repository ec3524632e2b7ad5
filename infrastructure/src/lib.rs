//! Infrastructure layer for local-oracle
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;
pub mod search;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileBehaviorConfig, FileConfig, FileLoggingConfig,
    FileOracleConfig, FileOutputConfig, FileProvidersConfig, FileReplConfig,
    FileSearchConfig,
};
pub use logging::JsonlConversationLogger;
pub use providers::{OllamaGateway, OpenAiCompatibleGateway, gateways_from_config};
pub use search::ScraperSearchGateway;
