//! Observability/control-surface configuration parsing from environment
//! variables.

use std::env;
use std::time::Duration;

use super::parse_env_or;

/// Bind address, port, and metrics cadence for the ops control surface
/// (health, scanner status, trending-list, `/metrics`).
#[derive(Debug, Clone)]
pub struct ObservabilityEnvConfig {
    pub enabled: bool,
    pub bind_address: String,
    pub port: u16,
    pub scrape_interval: Duration,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            scrape_interval: Duration::from_secs(15),
        }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            enabled: env::var("OBSERVABILITY_ENABLED")
                .ok()
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(default.enabled),
            bind_address: env::var("OBSERVABILITY_BIND_ADDRESS").unwrap_or(default.bind_address),
            port: parse_env_or("OBSERVABILITY_PORT", default.port),
            scrape_interval: Duration::from_secs(parse_env_or(
                "OBSERVABILITY_INTERVAL",
                default.scrape_interval.as_secs(),
            )),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
