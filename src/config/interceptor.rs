//! Interceptor activation configuration
//!
//! These values are handed verbatim to the external retry interceptor when it
//! is started. The ranges mirror what the interceptor itself accepts.

use serde::{Deserialize, Serialize};

/// Activation parameters for the external retry interceptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptorConfig {
    /// Initial delay before the first retry, in milliseconds
    pub delay_time_ms: u64,
    /// Interval between subsequent retries, in milliseconds
    pub retry_interval_ms: u64,
    /// Number of retries before a request is reported as exhausted
    pub max_retries: u32,
    /// Forward the interceptor's own diagnostic logging
    pub enable_logging: bool,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            delay_time_ms: 2000,
            retry_interval_ms: 3000,
            max_retries: 3,
            enable_logging: true,
        }
    }
}

impl InterceptorConfig {
    /// Validate the accepted ranges.
    pub fn validate(&self) -> Result<(), String> {
        if !(100..=10_000).contains(&self.delay_time_ms) {
            return Err(format!(
                "delay_time_ms must be between 100 and 10000, got {}",
                self.delay_time_ms
            ));
        }
        if !(1000..=30_000).contains(&self.retry_interval_ms) {
            return Err(format!(
                "retry_interval_ms must be between 1000 and 30000, got {}",
                self.retry_interval_ms
            ));
        }
        if !(1..=10).contains(&self.max_retries) {
            return Err(format!(
                "max_retries must be between 1 and 10, got {}",
                self.max_retries
            ));
        }
        Ok(())
    }
}
