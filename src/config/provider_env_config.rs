//! Upstream provider configuration parsing from environment variables.

use std::env;
use std::time::Duration;

use super::parse_env_or;

/// Configuration for the external market-data, holder-data, and chat
/// provider clients: base URLs, rate limits, and per-call deadlines.
#[derive(Debug, Clone)]
pub struct ProviderEnvConfig {
    pub geckoterminal_base_url: String,
    pub geckoterminal_rate_limit: u32,
    pub market_data_timeout: Duration,
    pub holder_api_base_url: String,
    pub holder_api_key: Option<String>,
    pub holder_timeout: Duration,
    pub chat_timeout: Duration,
}

impl Default for ProviderEnvConfig {
    fn default() -> Self {
        Self {
            geckoterminal_base_url: "https://api.geckoterminal.com/api/v2".to_string(),
            geckoterminal_rate_limit: 30,
            market_data_timeout: Duration::from_secs(10),
            holder_api_base_url: "https://api.holderscan.com/v0".to_string(),
            holder_api_key: None,
            holder_timeout: Duration::from_secs(7),
            chat_timeout: Duration::from_secs(10),
        }
    }
}

impl ProviderEnvConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            geckoterminal_base_url: env::var("GECKOTERMINAL_BASE_URL").unwrap_or(default.geckoterminal_base_url),
            geckoterminal_rate_limit: parse_env_or("GECKOTERMINAL_RATE_LIMIT", default.geckoterminal_rate_limit),
            market_data_timeout: Duration::from_secs(parse_env_or(
                "MARKET_DATA_TIMEOUT_SECONDS",
                default.market_data_timeout.as_secs(),
            )),
            holder_api_base_url: env::var("HOLDER_API_BASE_URL").unwrap_or(default.holder_api_base_url),
            holder_api_key: env::var("HOLDER_API_KEY").ok(),
            holder_timeout: Duration::from_secs(parse_env_or("HOLDER_TIMEOUT_SECONDS", default.holder_timeout.as_secs())),
            chat_timeout: Duration::from_secs(parse_env_or("CHAT_TIMEOUT_SECONDS", default.chat_timeout.as_secs())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holder_api_key_absent_by_default() {
        assert!(ProviderEnvConfig::default().holder_api_key.is_none());
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = ProviderEnvConfig::default();
        assert_eq!(cfg.geckoterminal_rate_limit, 30);
        assert_eq!(cfg.market_data_timeout, Duration::from_secs(10));
    }
}
