use crate::domain::errors::HolderDataError;
use crate::domain::ports::{HolderBreakdown, HolderClient, HolderDeltas};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::time::Duration;

const CHAIN_ID: &str = "sol";

/// HolderScan-style adapter. Absent an API key the client is `Disabled`
/// uniformly across both methods, mirroring the provider's own
/// enabled-flag gate: callers treat `Disabled` as "no data", never as a
/// fetch failure.
pub struct HolderScanClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HolderScanClient {
    pub fn new(client: ClientWithMiddleware, base_url: String, api_key: Option<String>) -> Self {
        Self::with_timeout(client, base_url, api_key, Duration::from_secs(7))
    }

    /// Bounds the total wall-clock time across all retry attempts; the
    /// client itself (see `HttpClientFactory::create_client`) bounds
    /// each individual attempt.
    pub fn with_timeout(
        client: ClientWithMiddleware,
        base_url: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self { client, base_url, api_key, timeout }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<Option<T>, HolderDataError> {
        let api_key = self.api_key.as_ref().ok_or(HolderDataError::Disabled)?;

        let response = tokio::time::timeout(
            self.timeout,
            self.client.get(url).header("x-api-key", api_key).send(),
        )
        .await
        .map_err(|_| HolderDataError::Timeout { duration_ms: self.timeout.as_millis() as u64 })?
        .map_err(|e| HolderDataError::Transient { reason: e.to_string() })?;

        match response.status() {
            reqwest::StatusCode::OK => response
                .json::<T>()
                .await
                .map(Some)
                .map_err(|e| HolderDataError::Transient { reason: e.to_string() }),
            reqwest::StatusCode::NOT_FOUND => Ok(None),
            reqwest::StatusCode::TOO_MANY_REQUESTS => Err(HolderDataError::Transient {
                reason: "rate limited".to_string(),
            }),
            status => Err(HolderDataError::Transient { reason: format!("status {status}") }),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct DeltasResponse {
    #[serde(rename = "1hour")]
    one_hour: Option<f64>,
    #[serde(rename = "1day")]
    one_day: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct BreakdownResponse {
    holders_over_100k_usd: Option<u32>,
    total_holders: Option<u32>,
    categories: Option<Categories>,
}

#[derive(Debug, Deserialize)]
struct Categories {
    whale: Option<u32>,
}

#[async_trait]
impl HolderClient for HolderScanClient {
    async fn get_holder_deltas(&self, token_address: &str) -> Result<HolderDeltas, HolderDataError> {
        let url = format!("{}/{CHAIN_ID}/tokens/{token_address}/holders/deltas", self.base_url);
        let parsed = self.get_json::<DeltasResponse>(&url).await?;
        Ok(parsed
            .map(|d| HolderDeltas { one_hour: d.one_hour, one_day: d.one_day })
            .unwrap_or_default())
    }

    async fn get_holder_breakdown(&self, token_address: &str) -> Result<HolderBreakdown, HolderDataError> {
        let url = format!("{}/{CHAIN_ID}/tokens/{token_address}/holders/breakdowns", self.base_url);
        let parsed = self.get_json::<BreakdownResponse>(&url).await?;
        Ok(parsed
            .map(|b| HolderBreakdown {
                holders_over_100k_usd: b.holders_over_100k_usd.unwrap_or(0),
                whale_count: b.categories.and_then(|c| c.whale).unwrap_or(0),
                total_holders: b.total_holders.unwrap_or(0),
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_response_parses_numeric_keys() {
        let json = r#"{"1hour": 12.5, "1day": -3.0}"#;
        let parsed: DeltasResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.one_hour, Some(12.5));
        assert_eq!(parsed.one_day, Some(-3.0));
    }

    #[test]
    fn breakdown_response_parses_whale_category() {
        let json = r#"{"holders_over_100k_usd": 7, "total_holders": 500, "categories": {"whale": 4}}"#;
        let parsed: BreakdownResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.holders_over_100k_usd, Some(7));
        assert_eq!(parsed.categories.unwrap().whale, Some(4));
    }

    #[tokio::test]
    async fn disabled_without_api_key_returns_disabled_error() {
        let client = HolderScanClient::new(
            crate::infrastructure::core::http_client_factory::HttpClientFactory::create_client(Duration::from_secs(7)),
            "https://api.holderscan.com/v0".to_string(),
            None,
        );
        assert!(!client.is_enabled());
        let result = client.get_holder_deltas("ABC123").await;
        assert!(matches!(result, Err(HolderDataError::Disabled)));
    }
}
