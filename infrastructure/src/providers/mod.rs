//! Model endpoint adapters
//!
//! One [`LlmGateway`] per protocol family:
//!
//! - [`OllamaGateway`]: the native runtime API (`/api/chat`, `/api/tags`)
//! - [`OpenAiCompatibleGateway`]: OpenAI-style servers such as LM Studio
//!   (`/v1/chat/completions`, `/v1/models`)

pub mod ollama;
pub mod openai_compat;

pub use ollama::OllamaGateway;
pub use openai_compat::OpenAiCompatibleGateway;

use crate::config::FileProvidersConfig;
use oracle_application::{GatewayError, GatewaySet, LlmGateway};
use std::sync::Arc;
use std::time::Duration;

/// TCP connection timeout for model endpoints.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the HTTP client shared by the model gateways.
///
/// No overall request timeout: the Oracle bounds each call itself.
pub(crate) fn http_client(endpoint: &str) -> Result<reqwest::Client, GatewayError> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| {
            GatewayError::ConnectionError(format!(
                "failed to build HTTP client for {}: {}",
                endpoint, e
            ))
        })
}

/// Map a transport-level failure to a gateway error.
pub(crate) fn request_error(endpoint: &str, e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(format!("cannot reach {}: {}", endpoint, e))
    } else if e.is_decode() {
        GatewayError::MalformedResponse(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

/// Turn a non-success status into a gateway error.
///
/// Both runtimes answer an unknown model with 404.
pub(crate) async fn status_error(model: Option<&str>, response: reqwest::Response) -> GatewayError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    match model {
        Some(model) if status == 404 => GatewayError::ModelNotAvailable(model.to_string()),
        _ => GatewayError::HttpStatus { status, body },
    }
}

/// Join a base URL and an API path without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Build one gateway per provider kind from the `[providers]` section.
pub fn gateways_from_config(config: &FileProvidersConfig) -> Result<GatewaySet, GatewayError> {
    let ollama: Arc<dyn LlmGateway> = Arc::new(OllamaGateway::new(&config.ollama.base_url)?);
    let compat = &config.openai_compatible;
    let openai: Arc<dyn LlmGateway> = Arc::new(
        OpenAiCompatibleGateway::new(&compat.base_url, compat.resolve_api_key())?
            .with_temperature(compat.temperature),
    );
    Ok(GatewaySet::new(vec![ollama, openai]))
}


#[cfg(test)]
mod tests {
    use super::*;
    use oracle_domain::ProviderKind;

    #[test]
    fn test_endpoint_joins_cleanly() {
        assert_eq!(
            endpoint("http://localhost:11434/", "/api/chat"),
            "http://localhost:11434/api/chat"
        );
        assert_eq!(
            endpoint("http://localhost:1234", "/v1/models"),
            "http://localhost:1234/v1/models"
        );
    }

    #[test]
    fn test_gateways_from_config_covers_both_providers() {
        let set = gateways_from_config(&FileProvidersConfig::default()).unwrap();
        assert!(set.resolve(ProviderKind::Ollama).is_some());
        assert!(set.resolve(ProviderKind::LmStudio).is_some());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connection_error() {
        // Bind then drop to get a port nothing listens on
        let port = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let base = format!("http://127.0.0.1:{}", port);
        let gateway = OllamaGateway::new(&base).unwrap();

        let result = gateway.available_models().await;
        assert!(matches!(result, Err(GatewayError::ConnectionError(_))));
    }
}
