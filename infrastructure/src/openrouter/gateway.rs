//! OpenRouter implementation of the LlmGateway port

use super::error::{OpenRouterError, Result};
use super::protocol::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use council_application::{CompletionResponse, GatewayError, LlmGateway, QueryOptions};
use council_domain::{Message, Model};
use std::time::Duration;
use tracing::{debug, trace};

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// One-shot chat-completions client
///
/// Makes exactly one HTTP attempt per [`query`](LlmGateway::query); retry
/// lives in the application layer.
pub struct OpenRouterGateway {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl OpenRouterGateway {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Build a gateway reading the API key from the environment variable `api_key_env`
    pub fn from_env(api_url: impl Into<String>, api_key_env: &str) -> Result<Self> {
        let api_key = std::env::var(api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| OpenRouterError::MissingApiKey(api_key_env.to_string()))?;
        Self::new(api_url, api_key)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl LlmGateway for OpenRouterGateway {
    async fn query(
        &self,
        model: &Model,
        messages: &[Message],
        options: &QueryOptions,
    ) -> std::result::Result<CompletionResponse, GatewayError> {
        let request = ChatRequest::new(model.as_str(), messages, options.web_search);
        let timeout = options.timeout.unwrap_or(DEFAULT_TIMEOUT);

        debug!(
            model = %model,
            messages = messages.len(),
            web_search = options.web_search,
            "sending chat completion request"
        );

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(map_transport_error)?;
        trace!(model = %model, bytes = body.len(), "received response body");

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::InvalidResponse(format!("failed to parse response: {e}"))
        })?;

        parsed
            .into_first_completion()
            .ok_or_else(|| GatewayError::InvalidResponse("response contained no choices".into()))
    }
}

fn map_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else if err.is_connect() {
        GatewayError::Connection(err.to_string())
    } else {
        GatewayError::Other(err.to_string())
    }
}
