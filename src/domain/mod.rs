pub mod alert;
pub mod analysis;
pub mod candle;
pub mod errors;
pub mod fibonacci;
pub mod ports;
pub mod repositories;
pub mod token;
pub mod trendline;
pub mod zone;
pub mod zone_state;
