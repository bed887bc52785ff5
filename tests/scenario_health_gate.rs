use dexsentinel::application::scanner::{Scanner, ScannerConfig};
use dexsentinel::domain::candle::{Candle, CandleSeries, PoolId};
use dexsentinel::domain::repositories::{AlertHistoryRepository, WatchlistRepository};
use dexsentinel::domain::token::{TokenRecord, TokenStatus};
use dexsentinel::infrastructure::mock::{
    FakeChatSink, FakeHolderClient, FakeMarketDataClient, InMemoryAlertHistoryRepository,
    InMemoryWatchlistRepository, InMemoryZoneStateRepository,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const TOKEN_ADDRESS: &str = "RuggedTok";

/// A 72-hour hourly probe series: an all-time high of 1.0 on the first
/// candle, a steady decline, and a last close of 0.05 — a 95% ATH drop.
fn rugged_probe_series() -> CandleSeries {
    let mut candles = vec![Candle {
        timestamp: 0,
        open: 1.0,
        high: 1.0,
        low: 0.99,
        close: 1.0,
        volume: 400_000.0,
    }];
    for i in 1..73 {
        let price = 1.0 - 0.95 * (i as f64 / 72.0);
        candles.push(Candle {
            timestamp: i as i64 * 3_600,
            open: price + 0.01,
            high: price + 0.02,
            low: price - 0.01,
            close: price,
            volume: 40_000.0,
        });
    }
    CandleSeries::from_candles(candles)
}

/// Scenario 6: a token with a severe ATH drop and thin volume should
/// score at or below zero, flip to `rugged`, and be skipped for the
/// rest of the tick — no signal recorded, nothing sent.
#[tokio::test]
async fn rugged_token_is_gated_before_any_strategy_runs() {
    let watchlist = Arc::new(InMemoryWatchlistRepository::new());
    let zone_states = Arc::new(InMemoryZoneStateRepository::new());
    let alert_history = Arc::new(InMemoryAlertHistoryRepository::new());
    let chat_sink = Arc::new(FakeChatSink::new());
    let market_data = Arc::new(FakeMarketDataClient::new(rugged_probe_series()));
    let holder_client = Arc::new(FakeHolderClient::disabled());

    watchlist
        .upsert(&TokenRecord {
            address: TOKEN_ADDRESS.to_string(),
            symbol: "RUG".to_string(),
            pool_id: PoolId::new("solana", TOKEN_ADDRESS),
            first_seen: 0,
            last_active: 0,
            status: TokenStatus::Active,
            health_score: 100.0,
            last_message_id: None,
            volume_24h: 50_000.0,
            base_price_usd: 1.0,
        })
        .await
        .unwrap();

    let config = ScannerConfig {
        network: "solana".to_string(),
        scan_interval: Duration::from_millis(30),
        trending_refresh_interval: Duration::from_secs(3_600),
        inter_token_pause: Duration::from_millis(1),
        trending_limit: 50,
        tick_error_backoff: Duration::from_secs(1),
    };

    let scanner = Arc::new(Scanner::new(
        market_data,
        holder_client,
        chat_sink.clone(),
        watchlist.clone(),
        zone_states,
        alert_history.clone(),
        config,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scan_task = {
        let scanner = scanner.clone();
        tokio::spawn(async move { scanner.run(shutdown_rx).await })
    };

    tokio::time::sleep(Duration::from_millis(150)).await;
    let _ = shutdown_tx.send(true);
    scan_task.await.unwrap();

    let status = scanner.status().await;
    assert!(status.last_tick_at.is_some(), "scanner should have completed at least one tick");
    assert_eq!(status.signals_emitted_last_tick, 0);

    let stored = watchlist.get(TOKEN_ADDRESS).await.unwrap().expect("token stays on the watchlist");
    assert_eq!(stored.status, TokenStatus::Rugged);
    assert!(stored.health_score <= 0.0);

    assert!(alert_history.all().await.is_empty());
    assert!(chat_sink.sent_texts.read().await.is_empty());
    assert!(chat_sink.sent_photos.read().await.is_empty());
}
