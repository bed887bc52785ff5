use thiserror::Error;

/// Errors surfaced by the OHLCV / trending-pools provider.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("pool not found: {pool_id}")]
    NotFound { pool_id: String },

    #[error("rate limited by provider")]
    RateLimited,

    #[error("transient provider failure: {reason}")]
    Transient { reason: String },

    #[error("malformed response from provider: {reason}")]
    Malformed { reason: String },

    #[error("request to provider timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },
}

/// Errors surfaced by the holder-stats provider. `Disabled` is not an
/// error condition for callers: it means "no credential configured",
/// which HealthChecker and StrategyEngine treat as "no data".
#[derive(Debug, Error)]
pub enum HolderDataError {
    #[error("holder client disabled (no credential configured)")]
    Disabled,

    #[error("holder provider request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    #[error("transient holder provider failure: {reason}")]
    Transient { reason: String },
}

/// Errors from the zone-state / alert-history / watchlist stores. These
/// propagate to the scan loop, which logs and continues; they never
/// suppress signal emission outright (the cooldown filter may give a
/// false negative once, per the persistence-failure policy).
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("record not found: {0}")]
    NotFound(String),
}

/// Fatal startup errors. Any of these cause the process to refuse to
/// start rather than run in a degraded mode.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("database unreachable at startup: {0}")]
    DatabaseUnreachable(String),
}

/// Errors raised by the chat sink adapter. A send failure never blocks
/// the scan loop: AlertRecord is always written before the publish is
/// attempted.
#[derive(Debug, Error)]
pub enum ChatSinkError {
    #[error("chat sink request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    #[error("chat sink rejected the message: {reason}")]
    Rejected { reason: String },
}
