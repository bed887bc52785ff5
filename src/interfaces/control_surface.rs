// =============================================================================
// Ops control surface — Axum 0.7
// =============================================================================
//
// Read-only visibility into the scan loop plus two operator actions: a
// forced trending-list refresh and the chat front-end's inbound webhook.
// The chat front-end itself (chart rendering, subscription checks) is an
// external collaborator and is not implemented here; `/webhook/telegram`
// only acknowledges receipt.
// =============================================================================

use crate::application::scanner::Scanner;
use crate::domain::ports::MarketDataClient;
use crate::infrastructure::observability::metrics::Metrics;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct ControlState {
    pub scanner: Arc<Scanner>,
    pub market_data: Arc<dyn MarketDataClient>,
    pub network: String,
    pub trending_limit: u32,
    pub metrics: Arc<Metrics>,
}

pub fn router(state: ControlState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/scanner-status", get(scanner_status))
        .route("/trending-list", get(trending_list))
        .route("/fetch-tokens", post(fetch_tokens))
        .route("/webhook/telegram", post(telegram_webhook))
        .route("/metrics", get(metrics))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn scanner_status(State(state): State<ControlState>) -> impl IntoResponse {
    let status = state.scanner.status().await;
    Json(json!({
        "running": status.running,
        "last_tick_at": status.last_tick_at,
        "tokens_processed_last_tick": status.tokens_processed_last_tick,
        "signals_emitted_last_tick": status.signals_emitted_last_tick,
        "last_error": status.last_error,
    }))
}

async fn trending_list(State(state): State<ControlState>) -> impl IntoResponse {
    match state.market_data.get_trending_pools(&state.network, state.trending_limit).await {
        Ok(tokens) => {
            let payload: Vec<_> = tokens
                .iter()
                .map(|t| {
                    json!({
                        "address": t.address,
                        "symbol": t.symbol,
                        "pool_id": t.pool_id.to_string(),
                        "volume_24h": t.volume_24h,
                        "base_price_usd": t.base_price_usd,
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "tokens": payload }))).into_response()
        }
        Err(err) => {
            warn!("trending-list fetch failed: {err}");
            (StatusCode::BAD_GATEWAY, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}

/// Forces an out-of-cycle trending-list merge into the watchlist, for
/// operators who don't want to wait for the periodic refresh tick.
async fn fetch_tokens(State(state): State<ControlState>) -> impl IntoResponse {
    match state.scanner.force_refresh_trending().await {
        Ok(merged) => (StatusCode::OK, Json(json!({ "merged": merged }))).into_response(),
        Err(err) => {
            warn!("manual fetch-tokens failed: {err}");
            (StatusCode::BAD_GATEWAY, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}

async fn telegram_webhook(body: String) -> impl IntoResponse {
    info!("received telegram webhook update ({} bytes)", body.len());
    StatusCode::OK
}

async fn metrics(State(state): State<ControlState>) -> impl IntoResponse {
    (StatusCode::OK, [("content-type", "text/plain; version=0.0.4")], state.metrics.render())
}
