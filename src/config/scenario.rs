//! Scenario scheduling configuration
//!
//! Target URLs and step timing for the scripted demonstration scenarios.
//! Tests shrink the delays to keep runtime short; the defaults match the
//! cadence a human watches the dashboard at.

use serde::{Deserialize, Serialize};

/// Timing and target endpoints used by the scenario orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Base URL for success-path demo requests
    pub probe_base_url: String,
    /// Base URL for error-path demo requests; status code is appended as path
    pub error_base_url: String,
    /// Spacing between scheduled suite sub-requests, in milliseconds
    pub suite_step_ms: u64,
    /// Delay before the offline scenario issues its queued requests
    pub offline_request_delay_ms: u64,
    /// Delay from offline scenario start until the network flag is restored
    pub online_restore_delay_ms: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            probe_base_url: "https://jsonplaceholder.typicode.com".to_string(),
            error_base_url: "https://httpstat.us".to_string(),
            suite_step_ms: 500,
            offline_request_delay_ms: 1000,
            online_restore_delay_ms: 3000,
        }
    }
}
