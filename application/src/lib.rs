//! Application layer for llm-council
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod gateway;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{CouncilConfig, CouncilConfigError};
pub use gateway::{FailureKind, ModelClient, QueryFailure, RetryPolicy};
pub use ports::{
    llm_gateway::{CompletionResponse, GatewayError, LlmGateway, QueryOptions},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::dispatch::{DispatchResults, ParallelDispatcher};
pub use use_cases::generate_title::{FALLBACK_TITLE, GenerateTitleUseCase};
pub use use_cases::run_council::{RunCouncilInput, RunCouncilUseCase};
