use crate::application::analysis_engine::AnalysisEngine;
use crate::application::cooldown_gate::CooldownGate;
use crate::application::health_checker::HealthChecker;
use crate::domain::ports::HolderDeltas;
use crate::application::strategy_engine::StrategyEngine;
use crate::application::timeframe_router::TimeframeRouter;
use crate::domain::alert::Signal;
use crate::domain::candle::{PoolId, Timeframe};
use crate::domain::ports::{ChatSink, HolderClient, MarketDataClient};
use crate::domain::repositories::{AlertHistoryRepository, WatchlistRepository, ZoneStateRepository};
use crate::domain::token::TokenRecord;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time;
use tracing::{error, info, warn};

const GEM_STRATEGY_AGE_HOURS: f64 = 5.0 * 24.0;
const PROBE_TIMEFRAME: Timeframe = Timeframe::Hour;
const PROBE_AGGREGATE: u32 = 1;
const PROBE_LIMIT: u32 = 100;
const GEM_TIMEFRAME: Timeframe = Timeframe::Minute;
const GEM_AGGREGATE: u32 = 5;

#[derive(Debug, Clone, Default)]
pub struct ScannerStatus {
    pub running: bool,
    pub last_tick_at: Option<i64>,
    pub tokens_processed_last_tick: usize,
    pub signals_emitted_last_tick: usize,
    pub last_error: Option<String>,
}

pub struct ScannerConfig {
    pub network: String,
    pub scan_interval: Duration,
    pub trending_refresh_interval: Duration,
    pub inter_token_pause: Duration,
    pub trending_limit: u32,
    pub tick_error_backoff: Duration,
}

/// The scheduling loop: refreshes the watchlist, runs health/zone/
/// strategy analysis per token, and publishes accepted signals. Runs
/// as one long-lived task until its shutdown watch fires.
pub struct Scanner {
    market_data: Arc<dyn MarketDataClient>,
    holder_client: Arc<dyn HolderClient>,
    chat_sink: Arc<dyn ChatSink>,
    watchlist: Arc<dyn WatchlistRepository>,
    zone_states: Arc<dyn ZoneStateRepository>,
    alert_history: Arc<dyn AlertHistoryRepository>,
    analysis_engine: AnalysisEngine,
    config: ScannerConfig,
    status: RwLock<ScannerStatus>,
}

impl Scanner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        market_data: Arc<dyn MarketDataClient>,
        holder_client: Arc<dyn HolderClient>,
        chat_sink: Arc<dyn ChatSink>,
        watchlist: Arc<dyn WatchlistRepository>,
        zone_states: Arc<dyn ZoneStateRepository>,
        alert_history: Arc<dyn AlertHistoryRepository>,
        config: ScannerConfig,
    ) -> Self {
        let analysis_engine = AnalysisEngine::new(market_data.clone());
        Self {
            market_data,
            holder_client,
            chat_sink,
            watchlist,
            zone_states,
            alert_history,
            analysis_engine,
            config,
            status: RwLock::new(ScannerStatus::default()),
        }
    }

    pub async fn status(&self) -> ScannerStatus {
        self.status.read().await.clone()
    }

    pub async fn run(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        info!("Scanner starting. Scan interval: {:?}", self.config.scan_interval);
        self.status.write().await.running = true;

        let mut scan_interval = time::interval(self.config.scan_interval);
        scan_interval.tick().await;
        let mut trending_interval = time::interval(self.config.trending_refresh_interval);

        loop {
            tokio::select! {
                _ = scan_interval.tick() => {
                    if let Err(err) = self.run_tick().await {
                        error!("Scanner tick failed: {err}");
                        self.status.write().await.last_error = Some(err.to_string());
                        time::sleep(self.config.tick_error_backoff).await;
                    }
                }
                _ = trending_interval.tick() => {
                    if let Err(err) = self.refresh_trending_list().await {
                        warn!("Trending list refresh failed: {err}");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Scanner shutdown signal received.");
                        break;
                    }
                }
            }
        }

        self.status.write().await.running = false;
    }

    async fn refresh_trending_list(&self) -> Result<(), crate::domain::errors::MarketDataError> {
        self.fetch_and_merge_trending().await?;
        Ok(())
    }

    /// Public entry point for the `/fetch-tokens` control-surface route:
    /// runs the same trending-list merge as the periodic refresh, on
    /// demand, and reports how many tokens were merged.
    pub async fn force_refresh_trending(&self) -> Result<usize, crate::domain::errors::MarketDataError> {
        self.fetch_and_merge_trending().await
    }

    async fn fetch_and_merge_trending(&self) -> Result<usize, crate::domain::errors::MarketDataError> {
        let trending = self.market_data.get_trending_pools(&self.config.network, self.config.trending_limit).await?;
        let mut merged_count = 0usize;
        for token in &trending {
            let mut merged = self
                .watchlist
                .get(&token.address)
                .await
                .ok()
                .flatten()
                .unwrap_or_else(|| token.clone());
            merged.merge_from_trending(token);
            if self.watchlist.upsert(&merged).await.is_err() {
                warn!("Failed to upsert watchlist entry for {}", token.address);
            } else {
                merged_count += 1;
            }
        }
        Ok(merged_count)
    }

    async fn run_tick(&self) -> Result<(), crate::domain::errors::PersistenceError> {
        let now = now_unix();
        let tokens = self.watchlist.list_active().await?;
        let mut processed = 0usize;
        let mut emitted = 0usize;

        for token in &tokens {
            match self.process_token(token, now).await {
                Ok(true) => emitted += 1,
                Ok(false) => {}
                Err(err) => warn!("Token {} skipped after error: {err}", token.address),
            }
            processed += 1;
            time::sleep(self.config.inter_token_pause).await;
        }

        let mut status = self.status.write().await;
        status.last_tick_at = Some(now);
        status.tokens_processed_last_tick = processed;
        status.signals_emitted_last_tick = emitted;
        status.last_error = None;
        Ok(())
    }

    /// Returns `Ok(true)` if a signal was emitted and published.
    async fn process_token(&self, token: &TokenRecord, now: i64) -> Result<bool, crate::domain::errors::PersistenceError> {
        let pool_id = token.pool_id.clone();

        let probe = match self.market_data.get_candles(&pool_id, PROBE_TIMEFRAME, PROBE_AGGREGATE, PROBE_LIMIT).await {
            Ok(series) => series,
            Err(err) => {
                warn!("Probe fetch failed for {}: {err}", token.address);
                return Ok(false);
            }
        };

        let ath = probe.highs().into_iter().fold(f64::MIN, f64::max);
        let current_price = probe.current_price().unwrap_or(token.base_price_usd);
        let age_hours = probe.age_hours();

        let holder_deltas = self.fetch_holder_deltas(&token.address).await;
        let report = HealthChecker::check(ath, current_price, age_hours, token.volume_24h, holder_deltas);

        let mut record = token.clone();
        record.health_score = report.health_score;
        record.status = report.status;
        self.watchlist.upsert(&record).await?;

        if report.status != crate::domain::token::TokenStatus::Active {
            return Ok(false);
        }

        let (timeframe, aggregate) = TimeframeRouter::pick(probe.len(), 0);

        let signal = if age_hours < GEM_STRATEGY_AGE_HOURS {
            self.run_gem_strategies(&pool_id, &token.symbol, now).await
        } else {
            self.run_full_strategy(&pool_id, timeframe, aggregate, &token.address, &token.symbol, now).await
        };

        let Some(mut signal) = signal else {
            return Ok(false);
        };
        if let Ok(breakdown) = self.holder_client.get_holder_breakdown(&token.address).await {
            signal.whale_count = Some(breakdown.whale_count);
        }

        let cooldown = CooldownGate::new(self.alert_history.as_ref());
        if cooldown.should_suppress(&signal, now).await? {
            return Ok(false);
        }

        self.alert_history.record(&signal).await?;
        self.publish(&signal).await;
        Ok(true)
    }

    async fn run_gem_strategies(&self, pool_id: &PoolId, symbol: &str, now: i64) -> Option<Signal> {
        let analysis = self
            .analysis_engine
            .perform_analysis(pool_id, GEM_TIMEFRAME, GEM_AGGREGATE, symbol, now)
            .await
            .ok()
            .flatten()?;
        let strategy = StrategyEngine::new(self.zone_states.as_ref());
        strategy.evaluate_gem_strategies(&analysis, &pool_id.to_string(), symbol, now)
    }

    async fn run_full_strategy(
        &self,
        pool_id: &PoolId,
        timeframe: Timeframe,
        aggregate: u32,
        token_address: &str,
        symbol: &str,
        now: i64,
    ) -> Option<Signal> {
        let analysis = self
            .analysis_engine
            .perform_analysis(pool_id, timeframe, aggregate, symbol, now)
            .await
            .ok()
            .flatten()?;
        let strategy = StrategyEngine::new(self.zone_states.as_ref());
        strategy.evaluate(&analysis, token_address, symbol, now).await.ok().flatten()
    }

    async fn fetch_holder_deltas(&self, token_address: &str) -> Option<HolderDeltas> {
        match self.holder_client.get_holder_deltas(token_address).await {
            Ok(deltas) => Some(deltas),
            Err(crate::domain::errors::HolderDataError::Disabled) => None,
            Err(err) => {
                warn!("Holder lookup failed for {token_address}: {err}");
                None
            }
        }
    }

    async fn publish(&self, signal: &Signal) {
        let caption = format_signal(signal);
        if self.chat_sink.send_photo(&caption, &[]).await.is_err() {
            if let Err(err) = self.chat_sink.send_text(&caption).await {
                error!("Chat sink rejected fallback text for {}: {err}", signal.token_address);
            }
        }
    }
}

fn format_signal(signal: &Signal) -> String {
    format!(
        "*{}* — {} at {:.8} (confidence {:.1})",
        signal.symbol,
        signal.kind.as_str(),
        signal.price,
        signal.confidence_score
    )
}

fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
