//! Domain layer for local-oracle
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Oracle
//!
//! The Oracle answers a prompt with a locally served model and, when the
//! model's own answer may be stale, checks it against web search evidence.
//!
//! ## Decision pipeline
//!
//! One `ask` is a chain of single-purpose model calls ([`Stage`]):
//! direct answer, sufficiency evaluation, query rewrite, evidence summary,
//! final composition. The states it passes through are [`PipelineState`].

pub mod config;
pub mod core;
pub mod pipeline;
pub mod prompt;
pub mod search;
pub mod session;
pub mod util;

// Re-export commonly used types
pub use config::{ConfigError, OracleConfig, OutputFormat, ProviderKind, SearchEngine};
pub use core::{error::DomainError, model::Model, prompt::Prompt};
pub use pipeline::{
    outcome::{Degradation, PipelineOutcome},
    parsing::{Sufficiency, clean_search_query, parse_sufficiency},
    state::{PipelineState, Stage},
};
pub use prompt::{PromptTemplate, StageRequest};
pub use search::entities::{SearchResult, format_evidence};
pub use session::{
    entities::{Message, Role},
    history::ConversationHistory,
};
