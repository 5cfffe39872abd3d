//! Infrastructure layer for llm-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod openrouter;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileCouncilConfig, FileGatewayConfig,
    FileOpenRouterConfig, FileOutputConfig, FileOutputFormat,
};
pub use openrouter::{
    error::{OpenRouterError, Result},
    gateway::OpenRouterGateway,
};
