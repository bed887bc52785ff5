use dexsentinel::application::system::Application;
use dexsentinel::config::Config;
use dexsentinel::interfaces::control_surface::{self, ControlState};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    info!("starting dexsentinel market surveillance service");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("fatal configuration error: {err}");
            std::process::exit(1);
        }
    };

    let observability = config.observability.clone();

    let app = match Application::build(config).await {
        Ok(app) => Arc::new(app),
        Err(err) => {
            error!("fatal startup error: {err}");
            std::process::exit(1);
        }
    };

    let handle = app.start();

    let state = ControlState {
        scanner: handle.scanner.clone(),
        market_data: app.market_data.clone(),
        network: app.config.network().to_string(),
        trending_limit: app.config.scanner.trending_tokens_limit,
        metrics: app.metrics.clone(),
    };

    if observability.enabled {
        let bind_addr = observability.bind_addr();
        info!("scanner running; control surface listening on {bind_addr}");
        let router = control_surface::router(state);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tokio::select! {
            result = axum::serve(listener, router) => {
                if let Err(err) = result {
                    error!("control surface exited: {err}");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received, stopping scanner");
            }
        }
    } else {
        info!("scanner running; control surface disabled (OBSERVABILITY_ENABLED=false)");
        tokio::signal::ctrl_c().await?;
        info!("shutdown signal received, stopping scanner");
    }

    let _ = handle.shutdown_tx.send(true);
    if let Err(err) = handle.scan_task.await {
        warn!("scan task did not shut down cleanly: {err}");
    }

    info!("dexsentinel stopped");
    Ok(())
}
