use crate::domain::alert::{AlertRecord, Signal};
use crate::domain::errors::PersistenceError;
use crate::domain::repositories::AlertHistoryRepository;
use crate::infrastructure::persistence::database::Database;
use async_trait::async_trait;
use sqlx::Row;

pub struct SqliteAlertHistoryRepository {
    database: Database,
}

impl SqliteAlertHistoryRepository {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl AlertHistoryRepository for SqliteAlertHistoryRepository {
    async fn record(&self, signal: &Signal) -> Result<AlertRecord, PersistenceError> {
        let row = sqlx::query(
            r#"
            INSERT INTO alert_history (
                token_address, signal_type, zone_price, price_at_alert, confidence_score, sent_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, token_address, signal_type, zone_price, price_at_alert, confidence_score, sent_at
            "#,
        )
        .bind(&signal.token_address)
        .bind(signal.kind.as_str())
        .bind(signal.zone_price)
        .bind(signal.price)
        .bind(signal.confidence_score)
        .bind(signal.timestamp)
        .fetch_one(&self.database.pool)
        .await?;

        row_to_record(row)
    }

    async fn most_recent_for_key(&self, cooldown_key: &str) -> Result<Option<AlertRecord>, PersistenceError> {
        let Some((token_address, anchor)) = cooldown_key.split_once(':') else {
            return Err(PersistenceError::NotFound(format!("malformed cooldown key: {cooldown_key}")));
        };

        let row = if let Ok(price) = anchor.parse::<f64>() {
            sqlx::query(
                r#"
                SELECT id, token_address, signal_type, zone_price, price_at_alert, confidence_score, sent_at
                FROM alert_history
                WHERE token_address = $1 AND zone_price IS NOT NULL AND ABS(zone_price - $2) / $2 < 0.001
                ORDER BY sent_at DESC
                LIMIT 1
                "#,
            )
            .bind(token_address)
            .bind(price)
            .fetch_optional(&self.database.pool)
            .await?
        } else {
            sqlx::query(
                r#"
                SELECT id, token_address, signal_type, zone_price, price_at_alert, confidence_score, sent_at
                FROM alert_history
                WHERE token_address = $1 AND signal_type = $2
                ORDER BY sent_at DESC
                LIMIT 1
                "#,
            )
            .bind(token_address)
            .bind(anchor)
            .fetch_optional(&self.database.pool)
            .await?
        };

        row.map(row_to_record).transpose()
    }
}

fn row_to_record(row: sqlx::sqlite::SqliteRow) -> Result<AlertRecord, PersistenceError> {
    Ok(AlertRecord {
        id: row.try_get("id")?,
        token_address: row.try_get("token_address")?,
        signal_type: row.try_get("signal_type")?,
        zone_price: row.try_get("zone_price")?,
        price_at_alert: row.try_get("price_at_alert")?,
        confidence_score: row.try_get("confidence_score")?,
        sent_at: row.try_get("sent_at")?,
    })
}
