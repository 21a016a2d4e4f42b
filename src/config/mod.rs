//! Configuration module for the retryscope console
//!
//! Provides layered configuration loading from files, environment variables,
//! and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`RETRYSCOPE_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use retryscope::config::ConsoleConfig;
//!
//! // Load defaults
//! let config = ConsoleConfig::default();
//! assert_eq!(config.server.port, 8700);
//!
//! // Parse from TOML
//! let toml = r#"
//! [server]
//! port = 9000
//! "#;
//! let config: ConsoleConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.server.port, 9000);
//! ```

pub mod error;
pub mod interceptor;
pub mod logging;
pub mod scenario;
pub mod server;
pub mod tracking;

pub use error::ConfigError;
pub use interceptor::InterceptorConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use scenario::ScenarioConfig;
pub use server::ServerConfig;
pub use tracking::TrackingConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the console server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConsoleConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Parameters handed to the external interceptor on start
    pub interceptor: InterceptorConfig,
    /// Observability capacities and poll period
    pub tracking: TrackingConfig,
    /// Scenario target URLs and step timing
    pub scenario: ScenarioConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ConsoleConfig {
    /// Load configuration from a TOML file.
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides (`RETRYSCOPE_PORT`,
    /// `RETRYSCOPE_HOST`, `RETRYSCOPE_LOG_LEVEL`).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("RETRYSCOPE_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(host) = std::env::var("RETRYSCOPE_HOST") {
            self.server.host = host;
        }
        if let Ok(level) = std::env::var("RETRYSCOPE_LOG_LEVEL") {
            self.logging.level = level;
        }
        self
    }

    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.interceptor.validate().map_err(ConfigError::Invalid)?;
        if self.tracking.log_capacity == 0 {
            return Err(ConfigError::Invalid(
                "tracking.log_capacity must be at least 1".to_string(),
            ));
        }
        if self.tracking.history_capacity == 0 {
            return Err(ConfigError::Invalid(
                "tracking.history_capacity must be at least 1".to_string(),
            ));
        }
        if self.tracking.stats_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tracking.stats_poll_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
