//! Provider configuration from TOML (`[providers]` section)

use crate::providers::ollama::DEFAULT_OLLAMA_URL;
use crate::providers::openai_compat::DEFAULT_LM_STUDIO_URL;
use serde::{Deserialize, Serialize};

/// Native runtime (Ollama) endpoint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOllamaConfig {
    /// Base URL of the runtime.
    pub base_url: String,
}

impl Default for FileOllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
        }
    }
}

/// OpenAI-compatible endpoint (LM Studio) configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiCompatibleConfig {
    /// Base URL of the server, without the `/v1` suffix.
    pub base_url: String,
    /// Environment variable name for the API key (default: "LM_STUDIO_API_KEY").
    pub api_key_env: String,
    /// Direct API key. Prefer the environment variable.
    pub api_key: Option<String>,
    /// Sampling temperature sent with every request.
    pub temperature: f32,
}

impl Default for FileOpenAiCompatibleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LM_STUDIO_URL.to_string(),
            api_key_env: "LM_STUDIO_API_KEY".to_string(),
            api_key: None,
            temperature: 0.7,
        }
    }
}

/// LM Studio accepts any bearer token; this is the one it documents.
pub const DEFAULT_LM_STUDIO_KEY: &str = "lm-studio";

impl FileOpenAiCompatibleConfig {
    /// Resolve the API key: config value, then environment, then the default.
    pub fn resolve_api_key(&self) -> String {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LM_STUDIO_KEY.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Native runtime settings.
    pub ollama: FileOllamaConfig,
    /// OpenAI-compatible server settings.
    pub openai_compatible: FileOpenAiCompatibleConfig,
}
