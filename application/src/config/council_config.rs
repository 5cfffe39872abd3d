//! Council configuration.
//!
//! [`CouncilConfig`] is everything a council run needs besides the question:
//! who answers, who synthesizes, and how individual calls behave. It is
//! read-only once a use case holds it.

use crate::gateway::RetryPolicy;
use council_domain::{AnonymizationLabel, Model};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CouncilConfigError {
    #[error("Council roster is empty")]
    EmptyRoster,

    #[error("Council has {count} models; at most {max} can be labelled for ranking")]
    TooManyModels { count: usize, max: usize },

    #[error("Model '{0}' appears more than once in the council")]
    DuplicateModel(Model),

    #[error("Retry policy must allow at least one attempt")]
    ZeroAttempts,

    #[error("Timeout must be greater than zero")]
    ZeroTimeout,

    #[error("Backoff minimum ({min:?}) exceeds maximum ({max:?})")]
    InvalidBackoff { min: Duration, max: Duration },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CouncilConfig {
    /// Council members, in display order
    pub models: Vec<Model>,
    /// Model that writes the Stage 3 synthesis
    pub chairman: Model,
    /// Model used for conversation titles
    pub title_model: Model,
    /// Default per-call timeout for council calls
    pub timeout: Duration,
    /// Timeout for title generation
    pub title_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for CouncilConfig {
    fn default() -> Self {
        Self {
            models: Model::default_council(),
            chairman: Model::default_chairman(),
            title_model: Model::default_title_model(),
            timeout: Duration::from_secs(120),
            title_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

impl CouncilConfig {
    pub fn new(models: Vec<Model>, chairman: Model) -> Self {
        Self {
            models,
            chairman,
            ..Self::default()
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check the configuration before any run starts
    ///
    /// Model identifiers are non-empty by construction, so the chairman
    /// needs no check of its own. The roster is capped at one model per
    /// anonymization label.
    pub fn validate(&self) -> Result<(), CouncilConfigError> {
        if self.models.is_empty() {
            return Err(CouncilConfigError::EmptyRoster);
        }
        if self.models.len() > AnonymizationLabel::CAPACITY {
            return Err(CouncilConfigError::TooManyModels {
                count: self.models.len(),
                max: AnonymizationLabel::CAPACITY,
            });
        }

        let mut seen = HashSet::new();
        for model in &self.models {
            if !seen.insert(model) {
                return Err(CouncilConfigError::DuplicateModel(model.clone()));
            }
        }

        if self.retry.max_attempts == 0 {
            return Err(CouncilConfigError::ZeroAttempts);
        }
        if self.timeout.is_zero() || self.title_timeout.is_zero() {
            return Err(CouncilConfigError::ZeroTimeout);
        }
        if self.retry.min_delay > self.retry.max_delay {
            return Err(CouncilConfigError::InvalidBackoff {
                min: self.retry.min_delay,
                max: self.retry.max_delay,
            });
        }

        Ok(())
    }
}
