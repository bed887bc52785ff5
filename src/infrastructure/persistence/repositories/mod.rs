pub mod sqlite_alert_history_repository;
pub mod sqlite_watchlist_repository;
pub mod sqlite_zone_state_repository;
