//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod council;
mod gateway;
mod openrouter;
mod output;

pub use council::FileCouncilConfig;
pub use gateway::FileGatewayConfig;
pub use openrouter::FileOpenRouterConfig;
pub use output::{FileOutputConfig, FileOutputFormat};

use council_application::{CouncilConfig, RetryPolicy};
use council_domain::{AnonymizationLabel, Model};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("{0} cannot be 0")]
    InvalidTimeout(&'static str),

    #[error("gateway.max_attempts cannot be 0")]
    ZeroAttempts,

    #[error("model name cannot be empty ({0})")]
    EmptyModelName(&'static str),

    #[error("model '{0}' is listed more than once in council.models")]
    DuplicateModel(String),

    #[error("council.models cannot be empty")]
    EmptyCouncil,

    #[error("council.models lists {0} models; at most {max} are supported", max = AnonymizationLabel::CAPACITY)]
    TooManyModels(usize),

    #[error("gateway.backoff_min_seconds ({min}) exceeds gateway.backoff_max_seconds ({max})")]
    InvalidBackoff { min: u64, max: u64 },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Roster, chairman and title model
    pub council: FileCouncilConfig,
    /// Timeouts and retry behaviour
    pub gateway: FileGatewayConfig,
    /// Provider endpoint and key lookup
    pub openrouter: FileOpenRouterConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Check the configuration, returning the first problem found
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let council = &self.council;
        if council.models.is_empty() {
            return Err(ConfigValidationError::EmptyCouncil);
        }
        if council.models.len() > AnonymizationLabel::CAPACITY {
            return Err(ConfigValidationError::TooManyModels(council.models.len()));
        }
        if council.models.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyModelName("council.models"));
        }
        let mut seen = HashSet::new();
        for name in &council.models {
            if !seen.insert(name.trim()) {
                return Err(ConfigValidationError::DuplicateModel(name.trim().to_string()));
            }
        }
        if council.chairman.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName("council.chairman"));
        }
        if council.title_model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName("council.title_model"));
        }

        let gateway = &self.gateway;
        if gateway.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout("gateway.timeout_seconds"));
        }
        if gateway.title_timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout(
                "gateway.title_timeout_seconds",
            ));
        }
        if gateway.max_attempts == 0 {
            return Err(ConfigValidationError::ZeroAttempts);
        }
        if gateway.backoff_min_seconds > gateway.backoff_max_seconds {
            return Err(ConfigValidationError::InvalidBackoff {
                min: gateway.backoff_min_seconds,
                max: gateway.backoff_max_seconds,
            });
        }

        Ok(())
    }

    /// Validate and convert into the application-layer configuration
    pub fn to_council_config(&self) -> Result<CouncilConfig, ConfigValidationError> {
        self.validate()?;

        let parse = |name: &str, field: &'static str| {
            Model::new(name).map_err(|_| ConfigValidationError::EmptyModelName(field))
        };
        let models = self
            .council
            .models
            .iter()
            .map(|m| parse(m, "council.models"))
            .collect::<Result<Vec<_>, _>>()?;

        let gateway = &self.gateway;
        Ok(CouncilConfig {
            models,
            chairman: parse(&self.council.chairman, "council.chairman")?,
            title_model: parse(&self.council.title_model, "council.title_model")?,
            timeout: Duration::from_secs(gateway.timeout_seconds),
            title_timeout: Duration::from_secs(gateway.title_timeout_seconds),
            retry: RetryPolicy {
                max_attempts: gateway.max_attempts,
                multiplier: Duration::from_secs(gateway.backoff_multiplier_seconds),
                min_delay: Duration::from_secs(gateway.backoff_min_seconds),
                max_delay: Duration::from_secs(gateway.backoff_max_seconds),
            },
        })
    }
}
