use crate::domain::errors::PersistenceError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

/// Shared SQLite pool for the watchlist, zone-state, and alert-history
/// stores. WAL mode lets the scan loop write while the control surface
/// reads concurrently.
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self, PersistenceError> {
        if let Some(path_part) = db_url.strip_prefix("sqlite://") {
            let path = Path::new(path_part);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)
                        .await
                        .map_err(|e| PersistenceError::NotFound(format!("cannot create db directory: {e}")))?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(db_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new().max_connections(5).connect_with(options).await?;

        info!("connected to database: {}", db_url);

        let db = Self { pool };
        db.init().await?;
        Ok(db)
    }

    async fn init(&self) -> Result<(), PersistenceError> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS watchlist_tokens (
                address TEXT PRIMARY KEY,
                symbol TEXT NOT NULL,
                pool_id TEXT NOT NULL,
                first_seen INTEGER NOT NULL,
                last_active INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'active',
                health_score REAL NOT NULL DEFAULT 100.0,
                last_message_id TEXT,
                volume_24h REAL NOT NULL DEFAULT 0.0,
                base_price_usd REAL NOT NULL DEFAULT 0.0
            );
            "#,
        )
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_watchlist_status
            ON watchlist_tokens (status);
            "#,
        )
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS zone_states (
                token_address TEXT NOT NULL,
                zone_price REAL NOT NULL,
                current_state TEXT NOT NULL,
                last_signal_type TEXT,
                last_signal_time INTEGER,
                last_price REAL NOT NULL DEFAULT 0.0,
                PRIMARY KEY (token_address, zone_price)
            );
            "#,
        )
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_zone_states_token
            ON zone_states (token_address);
            "#,
        )
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS alert_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                token_address TEXT NOT NULL,
                signal_type TEXT NOT NULL,
                zone_price REAL,
                price_at_alert REAL NOT NULL,
                confidence_score REAL NOT NULL,
                sent_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_alert_history_lookup
            ON alert_history (token_address, signal_type, sent_at);
            "#,
        )
        .execute(&mut *conn)
        .await?;

        info!("database schema initialized");
        Ok(())
    }
}
