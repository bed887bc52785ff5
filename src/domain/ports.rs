use crate::domain::candle::{CandleSeries, PoolId, Timeframe};
use crate::domain::errors::{ChatSinkError, HolderDataError, MarketDataError};
use crate::domain::token::TokenRecord;
use async_trait::async_trait;

/// Breakdown of holder concentration for one token. Purely additive
/// context for a Signal; absence never suppresses emission.
#[derive(Debug, Clone, Copy, Default)]
pub struct HolderBreakdown {
    pub holders_over_100k_usd: u32,
    pub whale_count: u32,
    pub total_holders: u32,
}

/// 1-hour and 24-hour net holder-count change, as fed to HealthChecker.
#[derive(Debug, Clone, Copy, Default)]
pub struct HolderDeltas {
    pub one_hour: Option<f64>,
    pub one_day: Option<f64>,
}

/// OHLCV / trending-pools provider, implemented against GeckoTerminal in
/// production and by an in-memory fake in tests.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    async fn get_candles(
        &self,
        pool_id: &PoolId,
        timeframe: Timeframe,
        aggregate: u32,
        limit: u32,
    ) -> Result<CandleSeries, MarketDataError>;

    async fn get_trending_pools(&self, network: &str, limit: u32) -> Result<Vec<TokenRecord>, MarketDataError>;

    async fn get_current_price(&self, pool_id: &PoolId) -> Result<f64, MarketDataError>;
}

/// Holder-concentration provider. An installation without a configured
/// credential runs with this port disabled, returning `Disabled`
/// uniformly rather than being wired out of the call sites.
#[async_trait]
pub trait HolderClient: Send + Sync {
    async fn get_holder_deltas(&self, token_address: &str) -> Result<HolderDeltas, HolderDataError>;

    /// Supplemental enrichment beyond the delta figures HealthChecker
    /// consumes; attached to a Signal's context when available.
    async fn get_holder_breakdown(&self, token_address: &str) -> Result<HolderBreakdown, HolderDataError>;
}

/// Outbound alert delivery sink.
#[async_trait]
pub trait ChatSink: Send + Sync {
    /// Sends a chart image with a caption, returning the provider's
    /// message id on success so a later retest can reply into the
    /// thread. Callers fall back to `send_text` if this fails.
    async fn send_photo(&self, caption: &str, image: &[u8]) -> Result<String, ChatSinkError>;

    async fn send_text(&self, text: &str) -> Result<String, ChatSinkError>;
}
