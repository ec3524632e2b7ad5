//! Prompt domain
//!
//! Templates and request builders for each model call of the pipeline.

mod template;

pub use template::{PromptTemplate, StageRequest};
