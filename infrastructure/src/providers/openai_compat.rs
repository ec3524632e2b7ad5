//! OpenAI-compatible gateway (LM Studio and similar local servers)

use super::{endpoint, http_client, request_error, status_error};
use crate::config::DEFAULT_LM_STUDIO_KEY;
use async_trait::async_trait;
use oracle_application::{GatewayError, LlmGateway};
use oracle_domain::{Message, Model, ProviderKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default address of a local LM Studio server.
pub const DEFAULT_LM_STUDIO_URL: &str = "http://localhost:1234";

const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

/// Gateway speaking the OpenAI chat completions API.
pub struct OpenAiCompatibleGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    temperature: f32,
}

impl OpenAiCompatibleGateway {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, GatewayError> {
        let base_url = base_url.into();
        Ok(Self {
            client: http_client(&base_url)?,
            base_url,
            api_key: api_key.into(),
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    /// Gateway for a local LM Studio server with its documented key.
    pub fn lm_studio(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        Self::new(base_url, DEFAULT_LM_STUDIO_KEY)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl LlmGateway for OpenAiCompatibleGateway {
    fn provider(&self) -> ProviderKind {
        ProviderKind::LmStudio
    }

    async fn complete(&self, messages: &[Message], model: &Model) -> Result<String, GatewayError> {
        let url = endpoint(&self.base_url, "/v1/chat/completions");
        debug!("POST {} (model: {}, {} messages)", url, model, messages.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&ChatCompletionRequest {
                model: model.as_str(),
                messages,
                temperature: self.temperature,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| request_error(&url, e))?;

        if !response.status().is_success() {
            return Err(status_error(Some(model.as_str()), response).await);
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        let Some(choice) = body.choices.into_iter().next() else {
            return Err(GatewayError::MalformedResponse(
                "response has no choices".to_string(),
            ));
        };

        match choice.message.content {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(GatewayError::EmptyResponse),
        }
    }

    async fn available_models(&self) -> Result<Vec<Model>, GatewayError> {
        let url = endpoint(&self.base_url, "/v1/models");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| request_error(&url, e))?;

        if !response.status().is_success() {
            return Err(status_error(None, response).await);
        }

        let models: ModelsResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        Ok(models
            .data
            .into_iter()
            .filter_map(|entry| Model::try_new(entry.id))
            .collect())
    }
}
