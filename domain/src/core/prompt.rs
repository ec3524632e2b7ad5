//! Prompt value object

use serde::{Deserialize, Serialize};

/// A user prompt to be answered by the Oracle (Value Object)
///
/// Guaranteed non-empty after trimming. The original text is kept as typed
/// so the conversation history records exactly what the user asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    content: String,
}

impl Prompt {
    /// Try to create a new prompt, returning None if it is blank
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            None
        } else {
            Some(Self { content })
        }
    }

    /// Get the prompt content
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl std::str::FromStr for Prompt {
    type Err = crate::core::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Prompt::try_new(s).ok_or(crate::core::error::DomainError::EmptyPrompt)
    }
}

impl std::fmt::Display for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}
