//! Configuration management for quotagate.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tracing::info;

use crate::error::{QuotagateError, Result};
use crate::gate::PathMatcher;
use crate::ratelimit::RateLimitProfile;

/// Main configuration for the quotagate service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotagateConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limit profile applied by the gate
    #[serde(default)]
    pub rate_limit: RateLimitProfile,

    /// Which paths the gate covers
    #[serde(default)]
    pub paths: PathMatcher,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

impl QuotagateConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: QuotagateConfig = serde_yaml::from_str(yaml)
            .map_err(|e| QuotagateError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that must not reach the gate.
    pub fn validate(&self) -> Result<()> {
        self.rate_limit.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = QuotagateConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.window_ms, 60_000);
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
server:
  listen_addr: 0.0.0.0:9000
rate_limit:
  window_ms: 30000
  max_requests: 20
  message: "Slow down."
paths:
  include: ["/api/*", "/checkout"]
  exclude: ["/api/health", "/api/ping"]
"#;
        let config = QuotagateConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.listen_addr.port(), 9000);
        assert_eq!(config.rate_limit.window_ms, 30_000);
        assert_eq!(config.rate_limit.max_requests, 20);
        assert_eq!(config.rate_limit.message, "Slow down.");
        assert_eq!(config.paths.include.len(), 2);
        assert_eq!(config.paths.exclude.len(), 2);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
rate_limit:
  max_requests: 5
"#;
        let config = QuotagateConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window_ms, 60_000);
        assert_eq!(config.server.listen_addr.port(), 8080);
        assert!(config.paths.should_limit("/api/anything"));
        assert!(!config.paths.should_limit("/api/health"));
    }

    #[test]
    fn test_invalid_profile_is_rejected_at_parse() {
        let yaml = r#"
rate_limit:
  window_ms: 0
"#;
        assert!(QuotagateConfig::from_yaml(yaml).is_err());
    }
}
