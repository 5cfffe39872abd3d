//! Gateway behaviour from TOML (`[gateway]` section)

use serde::{Deserialize, Serialize};

/// Per-call timeouts and retry backoff, in whole seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGatewayConfig {
    pub timeout_seconds: u64,
    pub title_timeout_seconds: u64,
    /// Total attempts per call, including the first
    pub max_attempts: u32,
    pub backoff_multiplier_seconds: u64,
    pub backoff_min_seconds: u64,
    pub backoff_max_seconds: u64,
}

impl Default for FileGatewayConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 120,
            title_timeout_seconds: 30,
            max_attempts: 3,
            backoff_multiplier_seconds: 1,
            backoff_min_seconds: 2,
            backoff_max_seconds: 10,
        }
    }
}
