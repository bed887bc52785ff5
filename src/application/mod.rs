pub mod analysis_engine;
pub mod cache;
pub mod cooldown_gate;
pub mod health_checker;
pub mod indicators;
pub mod scanner;
pub mod strategy_engine;
pub mod system;
pub mod timeframe_router;
pub mod trendline_detector;
pub mod zone_detector;
