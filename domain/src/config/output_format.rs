//! Output format value object

use serde::{Deserialize, Serialize};

/// How a one-shot answer is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The final answer only (default)
    #[default]
    Text,
    /// The answer plus search details
    Full,
    /// The whole pipeline outcome as JSON
    Json,
}
