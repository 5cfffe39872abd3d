//! LLM Gateway port
//!
//! Defines the interface for communicating with LLM providers.

use async_trait::async_trait;
use council_domain::{Message, Model};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors a single gateway attempt can produce
///
/// Adapters report what went wrong on the wire; classification into
/// user-facing failures happens in [`ModelClient`](crate::gateway::ModelClient).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Request timed out")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// HTTP status code, if the error came from a non-success response
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Per-call options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// Ask the provider to augment the answer with web results
    pub web_search: bool,
    /// Overrides the client's default timeout when set
    pub timeout: Option<Duration>,
}

impl QueryOptions {
    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.web_search = enabled;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// The first completion choice of a successful call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<serde_json::Value>,
}

impl CompletionResponse {
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Response text, empty when the provider sent no content
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// Gateway for LLM communication
///
/// This port defines how the application layer communicates with LLM providers.
/// Implementations (adapters) live in the infrastructure layer and make
/// exactly one attempt per call.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send `messages` to `model` and return the first completion choice
    async fn query(
        &self,
        model: &Model,
        messages: &[Message],
        options: &QueryOptions,
    ) -> Result<CompletionResponse, GatewayError>;
}
