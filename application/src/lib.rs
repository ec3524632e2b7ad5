//! Application layer for local-oracle
//!
//! This crate contains the Oracle use case, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::BehaviorConfig;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_gateway::{GatewayError, GatewaySet, LlmGateway},
    progress::{NoProgress, PipelineProgressNotifier},
    search_gateway::{NoSearch, SearchError, SearchGateway},
};
pub use use_cases::oracle::{Oracle, OracleError};
