//! Model provider value object

use super::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Protocol family of the model-serving endpoint.
///
/// Both variants satisfy the same completion contract; the kind only decides
/// which gateway the Oracle binds to when a configuration is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Native local-runtime protocol (Ollama `/api/chat`).
    #[default]
    #[serde(alias = "native_runtime", alias = "native")]
    Ollama,
    /// OpenAI-compatible REST protocol (LM Studio `/v1/chat/completions`).
    #[serde(
        alias = "openai_compatible",
        alias = "openai",
        alias = "lmstudio",
        alias = "lm-studio"
    )]
    LmStudio,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Ollama => "ollama",
            ProviderKind::LmStudio => "lm_studio",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" | "native" | "native_runtime" => Ok(ProviderKind::Ollama),
            "lm_studio" | "lmstudio" | "lm-studio" | "openai" | "openai_compatible" => {
                Ok(ProviderKind::LmStudio)
            }
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}
