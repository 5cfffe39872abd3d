//! OpenRouter chat-completions adapter
//!
//! Implements [`LlmGateway`](council_application::LlmGateway) over the
//! OpenRouter HTTP API (any OpenAI-compatible endpoint works).

pub mod error;
pub mod gateway;
pub mod protocol;
