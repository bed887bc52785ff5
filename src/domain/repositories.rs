use crate::domain::alert::{AlertRecord, Signal};
use crate::domain::errors::PersistenceError;
use crate::domain::token::TokenRecord;
use crate::domain::zone_state::ZoneState;
use async_trait::async_trait;

#[async_trait]
pub trait WatchlistRepository: Send + Sync {
    async fn upsert(&self, token: &TokenRecord) -> Result<(), PersistenceError>;
    async fn get(&self, address: &str) -> Result<Option<TokenRecord>, PersistenceError>;
    async fn list_active(&self) -> Result<Vec<TokenRecord>, PersistenceError>;
    async fn set_last_message_id(&self, address: &str, message_id: &str) -> Result<(), PersistenceError>;
}

#[async_trait]
pub trait ZoneStateRepository: Send + Sync {
    /// Fetches the state row for `(token_address, zone_price)`, collapsed
    /// within the 0.1% key-matching tolerance.
    async fn get(&self, token_address: &str, zone_price: f64) -> Result<Option<ZoneState>, PersistenceError>;
    async fn upsert(&self, state: &ZoneState) -> Result<(), PersistenceError>;
}

#[async_trait]
pub trait AlertHistoryRepository: Send + Sync {
    async fn record(&self, signal: &Signal) -> Result<AlertRecord, PersistenceError>;

    /// Most recent alert matching `cooldown_key`, if any, used by
    /// CooldownGate to compute elapsed time and last price.
    async fn most_recent_for_key(&self, cooldown_key: &str) -> Result<Option<AlertRecord>, PersistenceError>;
}
