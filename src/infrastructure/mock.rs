//! In-memory fakes for the domain ports, used by integration tests and
//! available to anyone embedding dexsentinel without standing up real
//! infrastructure. Mirrors the shape of the teacher's
//! `infrastructure::mock` module: plain structs behind `RwLock`, no
//! network or disk I/O.

use crate::domain::alert::{AlertRecord, Signal};
use crate::domain::candle::{CandleSeries, PoolId, Timeframe};
use crate::domain::errors::{ChatSinkError, HolderDataError, MarketDataError, PersistenceError};
use crate::domain::ports::{ChatSink, HolderBreakdown, HolderClient, HolderDeltas, MarketDataClient};
use crate::domain::repositories::{AlertHistoryRepository, WatchlistRepository, ZoneStateRepository};
use crate::domain::token::TokenRecord;
use crate::domain::zone_state::ZoneState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

/// Serves a fixed candle series for every `get_candles` call regardless
/// of the requested timeframe/aggregate, and a fixed trending list.
/// Good enough for driving the analysis pipeline end to end without a
/// real GeckoTerminal endpoint.
pub struct FakeMarketDataClient {
    series: CandleSeries,
    trending: Vec<TokenRecord>,
}

impl FakeMarketDataClient {
    pub fn new(series: CandleSeries) -> Self {
        Self { series, trending: Vec::new() }
    }

    pub fn with_trending(series: CandleSeries, trending: Vec<TokenRecord>) -> Self {
        Self { series, trending }
    }
}

#[async_trait]
impl MarketDataClient for FakeMarketDataClient {
    async fn get_candles(
        &self,
        _pool_id: &PoolId,
        _timeframe: Timeframe,
        _aggregate: u32,
        _limit: u32,
    ) -> Result<CandleSeries, MarketDataError> {
        Ok(self.series.clone())
    }

    async fn get_trending_pools(&self, _network: &str, limit: u32) -> Result<Vec<TokenRecord>, MarketDataError> {
        Ok(self.trending.iter().take(limit as usize).cloned().collect())
    }

    async fn get_current_price(&self, _pool_id: &PoolId) -> Result<f64, MarketDataError> {
        self.series.current_price().ok_or_else(|| MarketDataError::Malformed {
            reason: "fake series is empty".to_string(),
        })
    }
}

/// Disabled by default, matching `HolderScanClient` with no API key
/// configured; `with_deltas` opts a test into returning fixed figures.
#[derive(Default)]
pub struct FakeHolderClient {
    deltas: Option<HolderDeltas>,
    breakdown: Option<HolderBreakdown>,
}

impl FakeHolderClient {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_deltas(deltas: HolderDeltas) -> Self {
        Self { deltas: Some(deltas), breakdown: None }
    }

    pub fn with_breakdown(mut self, breakdown: HolderBreakdown) -> Self {
        self.breakdown = Some(breakdown);
        self
    }
}

#[async_trait]
impl HolderClient for FakeHolderClient {
    async fn get_holder_deltas(&self, _token_address: &str) -> Result<HolderDeltas, HolderDataError> {
        self.deltas.ok_or(HolderDataError::Disabled)
    }

    async fn get_holder_breakdown(&self, _token_address: &str) -> Result<HolderBreakdown, HolderDataError> {
        self.breakdown.ok_or(HolderDataError::Disabled)
    }
}

/// Records every message handed to it instead of sending it anywhere;
/// tests assert against `sent_texts`/`sent_photos`.
#[derive(Default)]
pub struct FakeChatSink {
    pub sent_photos: RwLock<Vec<String>>,
    pub sent_texts: RwLock<Vec<String>>,
}

impl FakeChatSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatSink for FakeChatSink {
    async fn send_photo(&self, caption: &str, _image: &[u8]) -> Result<String, ChatSinkError> {
        self.sent_photos.write().await.push(caption.to_string());
        Ok("mock-message-id".to_string())
    }

    async fn send_text(&self, text: &str) -> Result<String, ChatSinkError> {
        self.sent_texts.write().await.push(text.to_string());
        Ok("mock-message-id".to_string())
    }
}

#[derive(Default)]
pub struct InMemoryWatchlistRepository {
    tokens: RwLock<HashMap<String, TokenRecord>>,
}

impl InMemoryWatchlistRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(tokens: Vec<TokenRecord>) -> Self {
        let map = tokens.into_iter().map(|t| (t.address.clone(), t)).collect();
        Self { tokens: RwLock::new(map) }
    }
}

#[async_trait]
impl WatchlistRepository for InMemoryWatchlistRepository {
    async fn upsert(&self, token: &TokenRecord) -> Result<(), PersistenceError> {
        self.tokens.write().await.insert(token.address.clone(), token.clone());
        Ok(())
    }

    async fn get(&self, address: &str) -> Result<Option<TokenRecord>, PersistenceError> {
        Ok(self.tokens.read().await.get(address).cloned())
    }

    async fn list_active(&self) -> Result<Vec<TokenRecord>, PersistenceError> {
        Ok(self
            .tokens
            .read()
            .await
            .values()
            .filter(|t| t.status == crate::domain::token::TokenStatus::Active)
            .cloned()
            .collect())
    }

    async fn set_last_message_id(&self, address: &str, message_id: &str) -> Result<(), PersistenceError> {
        if let Some(token) = self.tokens.write().await.get_mut(address) {
            token.last_message_id = Some(message_id.to_string());
        }
        Ok(())
    }
}

/// Collapses lookups within `ZoneState::matches_price`'s 0.1% tolerance,
/// mirroring `SqliteZoneStateRepository`'s nearest-row-then-verify scan.
#[derive(Default)]
pub struct InMemoryZoneStateRepository {
    states: RwLock<HashMap<String, Vec<ZoneState>>>,
}

impl InMemoryZoneStateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ZoneStateRepository for InMemoryZoneStateRepository {
    async fn get(&self, token_address: &str, zone_price: f64) -> Result<Option<ZoneState>, PersistenceError> {
        let states = self.states.read().await;
        let Some(rows) = states.get(token_address) else { return Ok(None) };
        Ok(rows.iter().find(|s| s.matches_price(zone_price)).cloned())
    }

    async fn upsert(&self, state: &ZoneState) -> Result<(), PersistenceError> {
        let mut states = self.states.write().await;
        let rows = states.entry(state.token_address.clone()).or_default();
        if let Some(existing) = rows.iter_mut().find(|s| s.matches_price(state.zone_price)) {
            *existing = state.clone();
        } else {
            rows.push(state.clone());
        }
        Ok(())
    }
}

/// Append-only alert log keyed by `Signal::cooldown_key`, matching the
/// `(token_address, signal_type, timestamp desc limit 1)` query shape.
#[derive(Default)]
pub struct InMemoryAlertHistoryRepository {
    records: RwLock<HashMap<String, Vec<AlertRecord>>>,
    next_id: AtomicI64,
}

impl InMemoryAlertHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<AlertRecord> {
        self.records.read().await.values().flatten().cloned().collect()
    }
}

#[async_trait]
impl AlertHistoryRepository for InMemoryAlertHistoryRepository {
    async fn record(&self, signal: &Signal) -> Result<AlertRecord, PersistenceError> {
        let record = AlertRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            token_address: signal.token_address.clone(),
            signal_type: signal.kind.as_str().to_string(),
            zone_price: signal.zone_price,
            price_at_alert: signal.price,
            confidence_score: signal.confidence_score,
            sent_at: signal.timestamp,
        };
        self.records
            .write()
            .await
            .entry(signal.cooldown_key())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn most_recent_for_key(&self, cooldown_key: &str) -> Result<Option<AlertRecord>, PersistenceError> {
        Ok(self
            .records
            .read()
            .await
            .get(cooldown_key)
            .and_then(|rows| rows.iter().max_by_key(|r| r.sent_at))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alert::SignalKind;

    fn sample_signal(price: f64, timestamp: i64) -> Signal {
        Signal {
            kind: SignalKind::ResistanceBreakout,
            token_address: "Addr".into(),
            symbol: "TOK".into(),
            price,
            confidence_score: 9.0,
            timestamp,
            zone_price: Some(1.0),
            origin_multiple: None,
            fib_ratio: None,
            whale_count: None,
        }
    }

    #[tokio::test]
    async fn alert_history_returns_the_latest_record_for_a_key() {
        let history = InMemoryAlertHistoryRepository::new();
        history.record(&sample_signal(1.01, 100)).await.unwrap();
        history.record(&sample_signal(1.02, 200)).await.unwrap();

        let key = sample_signal(1.0, 0).cooldown_key();
        let latest = history.most_recent_for_key(&key).await.unwrap().unwrap();
        assert_eq!(latest.sent_at, 200);
    }

    #[tokio::test]
    async fn zone_state_lookup_collapses_within_tolerance() {
        let repo = InMemoryZoneStateRepository::new();
        repo.upsert(&ZoneState::idle("Addr", 1.000)).await.unwrap();

        let found = repo.get("Addr", 1.0003).await.unwrap();
        assert!(found.is_some());

        let missed = repo.get("Addr", 1.5).await.unwrap();
        assert!(missed.is_none());
    }

    #[tokio::test]
    async fn watchlist_list_active_filters_by_status() {
        let repo = InMemoryWatchlistRepository::new();
        let mut active = sample_token("A");
        active.status = crate::domain::token::TokenStatus::Active;
        let mut rugged = sample_token("B");
        rugged.status = crate::domain::token::TokenStatus::Rugged;
        repo.upsert(&active).await.unwrap();
        repo.upsert(&rugged).await.unwrap();

        let listed = repo.list_active().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].address, "A");
    }

    fn sample_token(address: &str) -> TokenRecord {
        TokenRecord {
            address: address.to_string(),
            symbol: "TOK".to_string(),
            pool_id: PoolId::new("solana", address),
            first_seen: 0,
            last_active: 0,
            status: crate::domain::token::TokenStatus::Active,
            health_score: 100.0,
            last_message_id: None,
            volume_24h: 0.0,
            base_price_usd: 0.0,
        }
    }
}
