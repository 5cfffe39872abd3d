//! Retrying client over an [`LlmGateway`].

use super::retry::RetryPolicy;
use crate::ports::llm_gateway::{CompletionResponse, GatewayError, LlmGateway, QueryOptions};
use council_domain::core::string::take_chars;
use council_domain::{Message, Model};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default per-call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Body excerpt length kept in `OtherHttp` messages
const BODY_EXCERPT_CHARS: usize = 200;

/// Why a model call ultimately failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    RateLimited,
    ServerError(u16),
    AuthError,
    NotFound,
    AccessDenied,
    OtherHttp(u16),
    Unknown,
}

impl FailureKind {
    pub fn classify(err: &GatewayError) -> Self {
        match err {
            GatewayError::Timeout => FailureKind::Timeout,
            GatewayError::Http { status, .. } => match *status {
                429 => FailureKind::RateLimited,
                401 => FailureKind::AuthError,
                403 => FailureKind::AccessDenied,
                404 => FailureKind::NotFound,
                s if s >= 500 => FailureKind::ServerError(s),
                s => FailureKind::OtherHttp(s),
            },
            GatewayError::Connection(_)
            | GatewayError::InvalidResponse(_)
            | GatewayError::Other(_) => FailureKind::Unknown,
        }
    }
}

/// Terminal failure of one model call, after any retries
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFailure {
    pub model: Model,
    pub kind: FailureKind,
    /// One-line diagnostic naming the model
    pub message: String,
}

impl QueryFailure {
    /// Build the diagnostic for `err`; `attempts` is the configured attempt limit
    pub fn from_error(model: Model, err: &GatewayError, attempts: u32) -> Self {
        let kind = FailureKind::classify(err);
        let message = match (kind, err) {
            (FailureKind::Timeout, _) => format!(
                "[{model}] Request timed out after {attempts} retries. The model may be overloaded."
            ),
            (FailureKind::RateLimited, _) => {
                format!("[{model}] Rate limited (429) after {attempts} retries. Try again later.")
            }
            (FailureKind::ServerError(status), _) => format!(
                "[{model}] Server error ({status}) after {attempts} retries. The provider may be experiencing issues."
            ),
            (FailureKind::AuthError, _) => {
                format!("[{model}] Authentication failed (401). Check your API key.")
            }
            (FailureKind::AccessDenied, _) => format!(
                "[{model}] Access denied (403). You may not have access to this model."
            ),
            (FailureKind::NotFound, _) => {
                format!("[{model}] Model not found (404). Check the model identifier.")
            }
            (FailureKind::OtherHttp(status), GatewayError::Http { body, .. }) => format!(
                "[{model}] HTTP error {status}: {}",
                take_chars(body, BODY_EXCERPT_CHARS)
            ),
            (_, other) => format!("[{model}] Error: {other}"),
        };
        Self {
            model,
            kind,
            message,
        }
    }

    /// Failure for a call that never produced a gateway result (e.g. a panicked task)
    pub fn unknown(model: Model, detail: impl fmt::Display) -> Self {
        let message = format!("[{model}] Error: {detail}");
        Self {
            model,
            kind: FailureKind::Unknown,
            message,
        }
    }
}

impl fmt::Display for QueryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for QueryFailure {}

/// Queries one model at a time with retry and backoff
///
/// Every failure path logs exactly one `warn!` line carrying the
/// [`QueryFailure`] message. Retries are logged at debug level.
pub struct ModelClient<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    policy: RetryPolicy,
    timeout: Duration,
}

impl<G: LlmGateway + 'static> ModelClient<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            policy: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Query `model`, retrying transient errors per the policy
    ///
    /// `options.timeout` falls back to the client's default when unset.
    pub async fn query(
        &self,
        model: &Model,
        messages: &[Message],
        options: &QueryOptions,
    ) -> Result<CompletionResponse, QueryFailure> {
        let options = QueryOptions {
            timeout: Some(options.timeout.unwrap_or(self.timeout)),
            ..options.clone()
        };
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.gateway.query(model, messages, &options).await {
                Ok(response) => {
                    if attempt > 1 {
                        debug!(model = %model, attempt, "request succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(err) => {
                    if !self.policy.is_retryable(&err) || attempt >= max_attempts {
                        let failure = QueryFailure::from_error(model.clone(), &err, max_attempts);
                        warn!(model = %model, attempt, kind = ?failure.kind, "{}", failure.message);
                        return Err(failure);
                    }

                    let delay = self.policy.delay_for(attempt - 1);
                    debug!(
                        model = %model,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying after transient error"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
