//! Native runtime gateway (Ollama HTTP API)

use super::{endpoint, http_client, request_error, status_error};
use async_trait::async_trait;
use oracle_application::{GatewayError, LlmGateway};
use oracle_domain::{Message, Model, ProviderKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default address of a local Ollama runtime.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

/// Gateway speaking the Ollama chat API.
pub struct OllamaGateway {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        let base_url = base_url.into();
        Ok(Self {
            client: http_client(&base_url)?,
            base_url,
        })
    }
}

#[async_trait]
impl LlmGateway for OllamaGateway {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    async fn complete(&self, messages: &[Message], model: &Model) -> Result<String, GatewayError> {
        let url = endpoint(&self.base_url, "/api/chat");
        debug!("POST {} (model: {}, {} messages)", url, model, messages.len());

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest {
                model: model.as_str(),
                messages,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| request_error(&url, e))?;

        if !response.status().is_success() {
            return Err(status_error(Some(model.as_str()), response).await);
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(GatewayError::RequestFailed(error));
        }

        match body.message {
            Some(message) if !message.content.trim().is_empty() => Ok(message.content),
            Some(_) => Err(GatewayError::EmptyResponse),
            None => Err(GatewayError::MalformedResponse(
                "response has no message".to_string(),
            )),
        }
    }

    async fn available_models(&self) -> Result<Vec<Model>, GatewayError> {
        let url = endpoint(&self.base_url, "/api/tags");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| request_error(&url, e))?;

        if !response.status().is_success() {
            return Err(status_error(None, response).await);
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        Ok(tags
            .models
            .into_iter()
            .filter_map(|entry| Model::try_new(entry.name))
            .collect())
    }
}
