//! Single-model querying with retry and failure classification
//!
//! [`ModelClient`] wraps an [`LlmGateway`](crate::ports::llm_gateway::LlmGateway)
//! and turns its one-shot calls into bounded-retry calls that always resolve
//! to either a response or a [`QueryFailure`].

mod client;
mod retry;

pub use client::{FailureKind, ModelClient, QueryFailure};
pub use retry::RetryPolicy;
