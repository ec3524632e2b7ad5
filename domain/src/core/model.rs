//! Model value object representing a locally served LLM

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Name of the model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "llama3.2";

/// A model identifier as understood by the model-serving endpoint (Value Object)
///
/// Local runtimes accept arbitrary tags (`llama3.2`, `qwen2.5:7b`,
/// `lmstudio-community/gemma-2-9b`), so the name is kept verbatim.
/// The only invariant is that it is non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Model(String);

impl Model {
    /// Try to create a model from a name, returning None if it is blank
    pub fn try_new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Model {
    /// Returns the default model (llama3.2)
    fn default() -> Self {
        Model(DEFAULT_MODEL.to_string())
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Model {
    type Err = crate::config::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::try_new(s).ok_or(crate::config::ConfigError::EmptyModelName)
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
