use crate::domain::candle::{Candle, CandleSeries, PoolId, Timeframe};
use crate::domain::errors::MarketDataError;
use crate::domain::ports::MarketDataClient;
use crate::domain::token::{TokenRecord, TokenStatus};
use crate::infrastructure::core::circuit_breaker::{CircuitBreaker, CircuitBreakerError};
use crate::infrastructure::core::http_client_factory::build_url_with_query;
use crate::infrastructure::core::rate_limiter::RateLimiter;
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub struct GeckoTerminalClient {
    client: ClientWithMiddleware,
    base_url: String,
    rate_limiter: RateLimiter,
    circuit_breaker: CircuitBreaker,
    timeout: Duration,
}

impl GeckoTerminalClient {
    pub fn new(client: ClientWithMiddleware, base_url: String, requests_per_second: u32) -> Self {
        Self::with_timeout(client, base_url, requests_per_second, Duration::from_secs(10))
    }

    /// Bounds the total wall-clock time across all retry attempts; the
    /// client itself (see `HttpClientFactory::create_client`) bounds
    /// each individual attempt.
    pub fn with_timeout(
        client: ClientWithMiddleware,
        base_url: String,
        requests_per_second: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url,
            rate_limiter: RateLimiter::new(requests_per_second),
            circuit_breaker: CircuitBreaker::new("geckoterminal", 5, 2, Duration::from_secs(30)),
            timeout,
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, MarketDataError> {
        self.rate_limiter.acquire().await;

        let client = &self.client;
        let timeout = self.timeout;
        let result = self
            .circuit_breaker
            .call(async move {
                let response = tokio::time::timeout(timeout, client.get(url).send())
                    .await
                    .map_err(|_| MarketDataError::Timeout { duration_ms: timeout.as_millis() as u64 })?
                    .map_err(|e| MarketDataError::Transient { reason: e.to_string() })?;

                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    return Err(MarketDataError::NotFound { pool_id: url.to_string() });
                }
                if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(MarketDataError::RateLimited);
                }
                if !response.status().is_success() {
                    return Err(MarketDataError::Transient { reason: format!("status {}", response.status()) });
                }

                response
                    .json::<T>()
                    .await
                    .map_err(|e| MarketDataError::Malformed { reason: e.to_string() })
            })
            .await;

        match result {
            Ok(value) => Ok(value),
            Err(CircuitBreakerError::Open(reason)) => Err(MarketDataError::Transient { reason }),
            Err(CircuitBreakerError::Inner(err)) => Err(err),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OhlcvResponse {
    data: OhlcvData,
}

#[derive(Debug, Deserialize)]
struct OhlcvData {
    attributes: OhlcvAttributes,
}

#[derive(Debug, Deserialize)]
struct OhlcvAttributes {
    ohlcv_list: Vec<[f64; 6]>,
}

#[async_trait]
impl MarketDataClient for GeckoTerminalClient {
    async fn get_candles(
        &self,
        pool_id: &PoolId,
        timeframe: Timeframe,
        aggregate: u32,
        limit: u32,
    ) -> Result<CandleSeries, MarketDataError> {
        let (network, address) = pool_id.parse().ok_or_else(|| MarketDataError::Malformed {
            reason: format!("malformed pool id: {pool_id}"),
        })?;

        let aggregate_str = aggregate.to_string();
        let limit_str = limit.min(1000).to_string();
        let url = build_url_with_query(
            &format!("{}/networks/{network}/pools/{address}/ohlcv/{}", self.base_url, timeframe.as_str()),
            &[("aggregate", aggregate_str.as_str()), ("limit", limit_str.as_str())],
        );

        let response: OhlcvResponse = self.get_json(&url).await?;

        let candles = response
            .data
            .attributes
            .ohlcv_list
            .into_iter()
            .map(|row| Candle {
                timestamp: row[0] as i64,
                open: row[1],
                high: row[2],
                low: row[3],
                close: row[4],
                volume: row[5],
            })
            .collect();

        Ok(CandleSeries::from_candles(candles))
    }

    async fn get_trending_pools(&self, network: &str, limit: u32) -> Result<Vec<TokenRecord>, MarketDataError> {
        let limit_str = limit.min(50).to_string();
        let url = build_url_with_query(
            &format!("{}/networks/{network}/trending_pools", self.base_url),
            &[("include", "base_token,quote_token"), ("limit", limit_str.as_str())],
        );

        let response: TrendingPoolsResponse = self.get_json(&url).await?;
        let included: HashMap<String, IncludedToken> = response
            .included
            .into_iter()
            .map(|token| (format!("{}:{}", token.kind, token.id), token.attributes))
            .collect();

        let now = now_unix();
        let tokens = response
            .data
            .into_iter()
            .filter_map(|pool| {
                let base_token_ref = pool.relationships.base_token.data;
                let key = format!("{}:{}", base_token_ref.kind, base_token_ref.id);
                let token_meta = included.get(&key)?;
                Some(TokenRecord {
                    address: token_meta.address.clone(),
                    symbol: token_meta.symbol.clone(),
                    pool_id: PoolId::new(network, &token_meta.address),
                    first_seen: now,
                    last_active: now,
                    status: TokenStatus::Active,
                    health_score: 100.0,
                    last_message_id: None,
                    volume_24h: pool.attributes.volume_usd.h24,
                    base_price_usd: pool.attributes.base_token_price_usd.parse().unwrap_or(0.0),
                })
            })
            .collect();

        Ok(tokens)
    }

    async fn get_current_price(&self, pool_id: &PoolId) -> Result<f64, MarketDataError> {
        let series = self.get_candles(pool_id, Timeframe::Minute, 1, 1).await?;
        series.current_price().ok_or_else(|| MarketDataError::Malformed {
            reason: "no candles returned for current price".to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TrendingPoolsResponse {
    data: Vec<TrendingPool>,
    #[serde(default)]
    included: Vec<IncludedEntry>,
}

#[derive(Debug, Deserialize)]
struct TrendingPool {
    attributes: TrendingPoolAttributes,
    relationships: TrendingPoolRelationships,
}

#[derive(Debug, Deserialize)]
struct TrendingPoolAttributes {
    volume_usd: VolumeUsd,
    base_token_price_usd: String,
}

#[derive(Debug, Deserialize)]
struct VolumeUsd {
    h24: f64,
}

#[derive(Debug, Deserialize)]
struct TrendingPoolRelationships {
    base_token: RelationshipRef,
}

#[derive(Debug, Deserialize)]
struct RelationshipRef {
    data: ResourceIdentifier,
}

#[derive(Debug, Deserialize)]
struct ResourceIdentifier {
    id: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct IncludedEntry {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    attributes: IncludedToken,
}

#[derive(Debug, Deserialize)]
struct IncludedToken {
    address: String,
    symbol: String,
}

fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ohlcv_row_maps_to_candle_fields() {
        let json = r#"{"data":{"attributes":{"ohlcv_list":[[1700000000,1.0,1.2,0.9,1.1,500.0]]}}}"#;
        let parsed: OhlcvResponse = serde_json::from_str(json).unwrap();
        let row = parsed.data.attributes.ohlcv_list[0];
        let candle = Candle { timestamp: row[0] as i64, open: row[1], high: row[2], low: row[3], close: row[4], volume: row[5] };
        assert!(candle.is_valid());
        assert_eq!(candle.timestamp, 1_700_000_000);
    }

    #[test]
    fn trending_pools_payload_resolves_included_token() {
        let json = r#"{
            "data": [{
                "attributes": {"volume_usd": {"h24": 123456.0}, "base_token_price_usd": "0.015"},
                "relationships": {"base_token": {"data": {"id": "abc", "type": "token"}}}
            }],
            "included": [{"id": "abc", "type": "token", "attributes": {"address": "ABC123", "symbol": "TOK"}}]
        }"#;
        let parsed: TrendingPoolsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.data.len(), 1);
        assert_eq!(parsed.included[0].attributes.symbol, "TOK");
    }
}
