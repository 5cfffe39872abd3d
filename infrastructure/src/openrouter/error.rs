//! Error types for the OpenRouter adapter

use thiserror::Error;

/// Errors when constructing the OpenRouter gateway
#[derive(Error, Debug)]
pub enum OpenRouterError {
    #[error("API key not found: set the {0} environment variable")]
    MissingApiKey(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, OpenRouterError>;
