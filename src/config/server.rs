//! HTTP server configuration

use serde::{Deserialize, Serialize};

/// Settings for the console's HTTP listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Outbound request timeout applied to the shared HTTP client
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8700,
            request_timeout_seconds: 30,
        }
    }
}
