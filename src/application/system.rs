use crate::application::scanner::{Scanner, ScannerConfig, ScannerStatus};
use crate::config::Config;
use crate::domain::errors::ConfigError;
use crate::domain::ports::{ChatSink, HolderClient, MarketDataClient};
use crate::domain::repositories::{AlertHistoryRepository, WatchlistRepository, ZoneStateRepository};
use crate::infrastructure::core::http_client_factory::HttpClientFactory;
use crate::infrastructure::observability::metrics::Metrics;
use crate::infrastructure::persistence::database::Database;
use crate::infrastructure::persistence::repositories::sqlite_alert_history_repository::SqliteAlertHistoryRepository;
use crate::infrastructure::persistence::repositories::sqlite_watchlist_repository::SqliteWatchlistRepository;
use crate::infrastructure::persistence::repositories::sqlite_zone_state_repository::SqliteZoneStateRepository;
use crate::infrastructure::providers::geckoterminal::GeckoTerminalClient;
use crate::infrastructure::providers::holder_client::HolderScanClient;
use crate::infrastructure::providers::telegram_chat_sink::TelegramChatSink;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// Handle to the running scan loop, returned by [`Application::start`]
/// so the control surface can observe status and the process can
/// cascade a shutdown signal.
pub struct SystemHandle {
    pub scanner: Arc<Scanner>,
    pub shutdown_tx: watch::Sender<bool>,
    pub scan_task: JoinHandle<()>,
}

/// Wires the concrete infrastructure adapters behind the domain ports
/// and exposes the assembled Scanner and control-surface dependencies.
/// Mirrors the "build once at startup" shape: every external call site
/// is constructed here, nowhere deeper in the call graph.
pub struct Application {
    pub config: Config,
    pub market_data: Arc<dyn MarketDataClient>,
    pub holder_client: Arc<dyn HolderClient>,
    pub chat_sink: Arc<dyn ChatSink>,
    pub watchlist: Arc<dyn WatchlistRepository>,
    pub zone_states: Arc<dyn ZoneStateRepository>,
    pub alert_history: Arc<dyn AlertHistoryRepository>,
    pub metrics: Arc<Metrics>,
}

impl Application {
    pub async fn build(config: Config) -> Result<Self, ConfigError> {
        info!("building dexsentinel application (network: {})", config.network());

        let database = Database::new(&config.database_url)
            .await
            .map_err(|e| ConfigError::DatabaseUnreachable(e.to_string()))?;

        let watchlist: Arc<dyn WatchlistRepository> =
            Arc::new(SqliteWatchlistRepository::new(database.clone()));
        let zone_states: Arc<dyn ZoneStateRepository> =
            Arc::new(SqliteZoneStateRepository::new(database.clone()));
        let alert_history: Arc<dyn AlertHistoryRepository> =
            Arc::new(SqliteAlertHistoryRepository::new(database.clone()));

        let market_data: Arc<dyn MarketDataClient> = Arc::new(GeckoTerminalClient::with_timeout(
            HttpClientFactory::create_client(config.provider.market_data_timeout),
            config.provider.geckoterminal_base_url.clone(),
            config.provider.geckoterminal_rate_limit,
            config.provider.market_data_timeout,
        ));

        let holder_client: Arc<dyn HolderClient> = Arc::new(HolderScanClient::with_timeout(
            HttpClientFactory::create_client(config.provider.holder_timeout),
            config.provider.holder_api_base_url.clone(),
            config.provider.holder_api_key.clone(),
            config.provider.holder_timeout,
        ));

        let chat_sink: Arc<dyn ChatSink> = Arc::new(TelegramChatSink::new(
            HttpClientFactory::create_client(config.provider.chat_timeout),
            config.telegram_bot_token.clone(),
            config.telegram_chat_id.clone(),
        ));

        let metrics = Arc::new(Metrics::new().map_err(|e| ConfigError::InvalidValue {
            name: "metrics".to_string(),
            reason: e.to_string(),
        })?);

        Ok(Self {
            config,
            market_data,
            holder_client,
            chat_sink,
            watchlist,
            zone_states,
            alert_history,
            metrics,
        })
    }

    /// Spawns the scan loop as a detached task and returns a handle the
    /// caller uses to read status and cascade shutdown.
    pub fn start(self: &Arc<Self>) -> SystemHandle {
        let scanner_config = ScannerConfig {
            network: self.config.scanner.network.clone(),
            scan_interval: self.config.scanner.scan_interval,
            trending_refresh_interval: self.config.scanner.trending_refresh_interval,
            inter_token_pause: self.config.scanner.inter_token_pause,
            trending_limit: self.config.scanner.trending_tokens_limit,
            tick_error_backoff: self.config.scanner.tick_error_backoff,
        };

        let scanner = Arc::new(Scanner::new(
            self.market_data.clone(),
            self.holder_client.clone(),
            self.chat_sink.clone(),
            self.watchlist.clone(),
            self.zone_states.clone(),
            self.alert_history.clone(),
            scanner_config,
        ));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let scan_task = {
            let scanner = scanner.clone();
            tokio::spawn(async move {
                scanner.run(shutdown_rx).await;
            })
        };

        SystemHandle { scanner, shutdown_tx, scan_task }
    }

    pub async fn scanner_status(&self, scanner: &Scanner) -> ScannerStatus {
        scanner.status().await
    }
}
