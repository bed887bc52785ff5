//! Scan-loop configuration parsing from environment variables.

use std::env;
use std::time::Duration;

use super::parse_env_or;

/// Scan-loop environment configuration: tick cadence, trending-list
/// refresh cadence, and the pacing applied between tokens within a tick.
#[derive(Debug, Clone)]
pub struct ScannerEnvConfig {
    pub network: String,
    pub scan_interval: Duration,
    pub trending_tokens_limit: u32,
    pub trending_refresh_interval: Duration,
    pub inter_token_pause: Duration,
    pub tick_error_backoff: Duration,
}

impl Default for ScannerEnvConfig {
    fn default() -> Self {
        Self {
            network: "solana".to_string(),
            scan_interval: Duration::from_secs(120),
            trending_tokens_limit: 50,
            trending_refresh_interval: Duration::from_secs(600),
            inter_token_pause: Duration::from_secs(5),
            tick_error_backoff: Duration::from_secs(60),
        }
    }
}

impl ScannerEnvConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            network: env::var("NETWORK").unwrap_or(default.network),
            scan_interval: Duration::from_secs(parse_env_or("SCAN_INTERVAL", default.scan_interval.as_secs())),
            trending_tokens_limit: parse_env_or("TRENDING_TOKENS_LIMIT", default.trending_tokens_limit),
            trending_refresh_interval: Duration::from_secs(parse_env_or(
                "TRENDING_REFRESH_INTERVAL_SECONDS",
                default.trending_refresh_interval.as_secs(),
            )),
            inter_token_pause: Duration::from_secs(parse_env_or(
                "INTER_TOKEN_PAUSE_SECONDS",
                default.inter_token_pause.as_secs(),
            )),
            tick_error_backoff: Duration::from_secs(parse_env_or(
                "TICK_ERROR_BACKOFF_SECONDS",
                default.tick_error_backoff.as_secs(),
            )),
        }
    }
}
