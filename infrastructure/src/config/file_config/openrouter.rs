//! Provider settings from TOML (`[openrouter]` section)

use crate::openrouter::gateway::{DEFAULT_API_KEY_ENV, DEFAULT_API_URL};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenRouterConfig {
    /// Chat-completions endpoint
    pub api_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
}

impl Default for FileOpenRouterConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}
