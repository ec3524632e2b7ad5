//! LLM Gateway port
//!
//! Defines the interface for communicating with model-serving endpoints.

use async_trait::async_trait;
use oracle_domain::{Message, Model, ProviderKind};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("No response from model")]
    EmptyResponse,

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,
}

/// Gateway for LLM communication
///
/// Both protocol variants (native runtime, OpenAI-compatible) implement
/// this same contract. The Oracle only ever calls [`complete`](Self::complete);
/// [`provider`](Self::provider) is used to pick the gateway when a
/// configuration is applied.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Protocol family this gateway speaks
    fn provider(&self) -> ProviderKind;

    /// Send role-tagged messages to `model` and return the generated text
    async fn complete(&self, messages: &[Message], model: &Model) -> Result<String, GatewayError>;

    /// Models the endpoint currently serves
    async fn available_models(&self) -> Result<Vec<Model>, GatewayError>;
}

/// The model gateways known to an Oracle, one per provider kind.
#[derive(Clone, Default)]
pub struct GatewaySet {
    gateways: Vec<Arc<dyn LlmGateway>>,
}

impl GatewaySet {
    pub fn new(gateways: Vec<Arc<dyn LlmGateway>>) -> Self {
        Self { gateways }
    }

    /// Register a gateway. A later registration for the same provider wins.
    pub fn with(mut self, gateway: Arc<dyn LlmGateway>) -> Self {
        self.gateways.push(gateway);
        self
    }

    /// Find the gateway for `kind`.
    pub fn resolve(&self, kind: ProviderKind) -> Option<Arc<dyn LlmGateway>> {
        self.gateways
            .iter()
            .rev()
            .find(|g| g.provider() == kind)
            .cloned()
    }

    /// Provider kinds with a registered gateway, in first-registration order.
    pub fn providers(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<ProviderKind> = Vec::new();
        for kind in self.gateways.iter().map(|g| g.provider()) {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        kinds
    }
}
