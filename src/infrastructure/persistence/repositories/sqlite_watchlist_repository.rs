use crate::domain::candle::PoolId;
use crate::domain::errors::PersistenceError;
use crate::domain::repositories::WatchlistRepository;
use crate::domain::token::{TokenRecord, TokenStatus};
use crate::infrastructure::persistence::database::Database;
use async_trait::async_trait;
use sqlx::Row;

pub struct SqliteWatchlistRepository {
    database: Database,
}

impl SqliteWatchlistRepository {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl WatchlistRepository for SqliteWatchlistRepository {
    async fn upsert(&self, token: &TokenRecord) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO watchlist_tokens (
                address, symbol, pool_id, first_seen, last_active,
                status, health_score, last_message_id, volume_24h, base_price_usd
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT(address) DO UPDATE SET
                symbol = excluded.symbol,
                pool_id = excluded.pool_id,
                last_active = excluded.last_active,
                status = excluded.status,
                health_score = excluded.health_score,
                volume_24h = excluded.volume_24h,
                base_price_usd = excluded.base_price_usd
            "#,
        )
        .bind(&token.address)
        .bind(&token.symbol)
        .bind(token.pool_id.to_string())
        .bind(token.first_seen)
        .bind(token.last_active)
        .bind(token.status.as_str())
        .bind(token.health_score)
        .bind(&token.last_message_id)
        .bind(token.volume_24h)
        .bind(token.base_price_usd)
        .execute(&self.database.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, address: &str) -> Result<Option<TokenRecord>, PersistenceError> {
        let row = sqlx::query("SELECT * FROM watchlist_tokens WHERE address = $1")
            .bind(address)
            .fetch_optional(&self.database.pool)
            .await?;

        row.map(row_to_token).transpose()
    }

    async fn list_active(&self) -> Result<Vec<TokenRecord>, PersistenceError> {
        let rows = sqlx::query("SELECT * FROM watchlist_tokens WHERE status != 'rugged'")
            .fetch_all(&self.database.pool)
            .await?;

        rows.into_iter().map(row_to_token).collect()
    }

    async fn set_last_message_id(&self, address: &str, message_id: &str) -> Result<(), PersistenceError> {
        sqlx::query("UPDATE watchlist_tokens SET last_message_id = $1 WHERE address = $2")
            .bind(message_id)
            .bind(address)
            .execute(&self.database.pool)
            .await?;

        Ok(())
    }
}

fn row_to_token(row: sqlx::sqlite::SqliteRow) -> Result<TokenRecord, PersistenceError> {
    let pool_id_str: String = row.try_get("pool_id")?;
    let status_str: String = row.try_get("status")?;

    Ok(TokenRecord {
        address: row.try_get("address")?,
        symbol: row.try_get("symbol")?,
        pool_id: PoolId(pool_id_str),
        first_seen: row.try_get("first_seen")?,
        last_active: row.try_get("last_active")?,
        status: TokenStatus::from_str(&status_str).unwrap_or(TokenStatus::Active),
        health_score: row.try_get("health_score")?,
        last_message_id: row.try_get("last_message_id")?,
        volume_24h: row.try_get("volume_24h")?,
        base_price_usd: row.try_get("base_price_usd")?,
    })
}
