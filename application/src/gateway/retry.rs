//! Exponential backoff policy for gateway calls.

use crate::ports::llm_gateway::GatewayError;
use std::time::Duration;

/// Retry behaviour for a single model call
///
/// The delay before retry `n` (0-indexed) is `multiplier * 2^n`, clamped
/// to `[min_delay, max_delay]`. With the defaults that gives 2s, 2s.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub multiplier: Duration,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier: Duration::from_secs(1),
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Timeouts, 5xx and 429 are worth another attempt; nothing else is.
    pub fn is_retryable(&self, err: &GatewayError) -> bool {
        match err {
            GatewayError::Timeout => true,
            GatewayError::Http { status, .. } => *status == 429 || *status >= 500,
            GatewayError::Connection(_)
            | GatewayError::InvalidResponse(_)
            | GatewayError::Other(_) => false,
        }
    }

    /// Delay to sleep before retry number `retry_index` (0 = first retry)
    pub fn delay_for(&self, retry_index: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry_index);
        let raw = self.multiplier.saturating_mul(factor);
        raw.max(self.min_delay).min(self.max_delay)
    }
}
