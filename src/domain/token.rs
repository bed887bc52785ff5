use crate::domain::candle::PoolId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    Active,
    Warning,
    Rugged,
}

impl TokenStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenStatus::Active => "active",
            TokenStatus::Warning => "warning",
            TokenStatus::Rugged => "rugged",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(TokenStatus::Active),
            "warning" => Some(TokenStatus::Warning),
            "rugged" => Some(TokenStatus::Rugged),
            _ => None,
        }
    }
}

/// A watchlist entry. `health_score` and `status` are refreshed every
/// tick by HealthChecker; `last_message_id` lets the chat sink reply
/// into an existing thread instead of starting a new one.
#[derive(Debug, Clone)]
pub struct TokenRecord {
    pub address: String,
    pub symbol: String,
    pub pool_id: PoolId,
    pub first_seen: i64,
    pub last_active: i64,
    pub status: TokenStatus,
    pub health_score: f64,
    pub last_message_id: Option<String>,
    pub volume_24h: f64,
    pub base_price_usd: f64,
}

impl TokenRecord {
    /// Merges a trending-list record into the watchlist, preferring the
    /// trending record's volume/price fields but keeping local history
    /// (first_seen, status, health_score, last_message_id), per
    /// Scanner tick step 1.
    pub fn merge_from_trending(&mut self, trending: &TokenRecord) {
        self.volume_24h = trending.volume_24h;
        self.base_price_usd = trending.base_price_usd;
        self.symbol = trending.symbol.clone();
        self.pool_id = trending.pool_id.clone();
    }
}
