use crate::domain::errors::PersistenceError;
use crate::domain::repositories::ZoneStateRepository;
use crate::domain::zone_state::{ZoneState, ZoneStateKind};
use crate::infrastructure::persistence::database::Database;
use async_trait::async_trait;
use sqlx::Row;

pub struct SqliteZoneStateRepository {
    database: Database,
}

impl SqliteZoneStateRepository {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl ZoneStateRepository for SqliteZoneStateRepository {
    async fn get(&self, token_address: &str, zone_price: f64) -> Result<Option<ZoneState>, PersistenceError> {
        // Collapses to the nearest stored zone_price within 0.1% of the
        // requested key, matching ZoneState::matches_price in-memory.
        let row = sqlx::query(
            r#"
            SELECT * FROM zone_states
            WHERE token_address = $1
            ORDER BY ABS(zone_price - $2) ASC
            LIMIT 1
            "#,
        )
        .bind(token_address)
        .bind(zone_price)
        .fetch_optional(&self.database.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let state = row_to_state(row)?;
        if state.matches_price(zone_price) {
            Ok(Some(state))
        } else {
            Ok(None)
        }
    }

    async fn upsert(&self, state: &ZoneState) -> Result<(), PersistenceError> {
        // The collapse tolerance means a caller may pass a zone_price
        // that differs slightly from the stored row; resolve the actual
        // key first so the upsert updates the existing row rather than
        // inserting a near-duplicate.
        let existing_key = self
            .get(&state.token_address, state.zone_price)
            .await?
            .map(|s| s.zone_price)
            .unwrap_or(state.zone_price);

        sqlx::query(
            r#"
            INSERT INTO zone_states (
                token_address, zone_price, current_state,
                last_signal_type, last_signal_time, last_price
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT(token_address, zone_price) DO UPDATE SET
                current_state = excluded.current_state,
                last_signal_type = excluded.last_signal_type,
                last_signal_time = excluded.last_signal_time,
                last_price = excluded.last_price
            "#,
        )
        .bind(&state.token_address)
        .bind(existing_key)
        .bind(state.current_state.as_str())
        .bind(&state.last_signal_type)
        .bind(state.last_signal_time)
        .bind(state.last_price)
        .execute(&self.database.pool)
        .await?;

        Ok(())
    }
}

fn row_to_state(row: sqlx::sqlite::SqliteRow) -> Result<ZoneState, PersistenceError> {
    let current_state_str: String = row.try_get("current_state")?;

    Ok(ZoneState {
        token_address: row.try_get("token_address")?,
        zone_price: row.try_get("zone_price")?,
        current_state: ZoneStateKind::from_str(&current_state_str).unwrap_or(ZoneStateKind::Idle),
        last_signal_type: row.try_get("last_signal_type")?,
        last_signal_time: row.try_get("last_signal_time")?,
        last_price: row.try_get("last_price")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_kind_round_trips() {
        for kind in [
            ZoneStateKind::Idle,
            ZoneStateKind::ApproachingUp,
            ZoneStateKind::ApproachingDown,
            ZoneStateKind::Testing,
            ZoneStateKind::BrokenUp,
            ZoneStateKind::BrokenDown,
            ZoneStateKind::Cooldown,
        ] {
            assert_eq!(ZoneStateKind::from_str(kind.as_str()), Some(kind));
        }
    }
}
