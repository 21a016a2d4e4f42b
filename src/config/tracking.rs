//! Tracking and observability limits

use serde::{Deserialize, Serialize};

/// Capacities of the bounded observability structures and the status poll
/// period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Maximum retained activity log entries
    pub log_capacity: usize,
    /// Maximum retained request history entries
    pub history_capacity: usize,
    /// Period of the interceptor status poll, in milliseconds
    pub stats_poll_interval_ms: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            log_capacity: 50,
            history_capacity: 20,
            stats_poll_interval_ms: 1000,
        }
    }
}
