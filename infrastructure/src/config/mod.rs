//! Configuration file loading for local-oracle
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `ORACLE_`-prefixed environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./oracle.toml` or `./.oracle.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/local-oracle/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_LM_STUDIO_KEY, DEFAULT_USER_AGENT, FileBehaviorConfig,
    FileConfig, FileLoggingConfig, FileOllamaConfig, FileOpenAiCompatibleConfig,
    FileOracleConfig, FileOutputConfig, FileProvidersConfig, FileReplConfig,
    FileSearchConfig,
};
pub use loader::ConfigLoader;
