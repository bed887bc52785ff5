use serde::{Deserialize, Serialize};

/// A single OHLCV bar. Immutable once ingested.
///
/// Invariant: `low <= min(open, close) <= max(open, close) <= high`,
/// `volume >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Checks the wick/body invariant and non-negative volume. Callers at
    /// the provider boundary reject candles failing this check rather
    /// than letting them reach the analysis pipeline.
    pub fn is_valid(&self) -> bool {
        let body_lo = self.open.min(self.close);
        let body_hi = self.open.max(self.close);
        self.low <= body_lo
            && body_hi <= self.high
            && self.volume >= 0.0
            && self.low.is_finite()
            && self.high.is_finite()
            && self.open.is_finite()
            && self.close.is_finite()
    }
}

/// Supported timeframe families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Minute,
    Hour,
    Day,
}

impl Timeframe {
    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::Minute => "minute",
            Timeframe::Hour => "hour",
            Timeframe::Day => "day",
        }
    }

    /// Seconds per unit aggregate=1 candle of this timeframe.
    pub fn unit_seconds(self) -> i64 {
        match self {
            Timeframe::Minute => 60,
            Timeframe::Hour => 3_600,
            Timeframe::Day => 86_400,
        }
    }
}

/// An ordered, strictly-increasing-timestamp sequence of candles for a
/// single `(pool, timeframe, aggregate)` key, plus derived moving
/// averages computed once the series is long enough.
#[derive(Debug, Clone, Default)]
pub struct CandleSeries {
    pub candles: Vec<Candle>,
    pub ema_50: Option<Vec<f64>>,
    pub ema_200: Option<Vec<f64>>,
}

impl CandleSeries {
    /// Builds a series from provider-supplied candles, sorting ascending
    /// by timestamp and dropping any candle that fails the OHLCV
    /// invariant (invalid input is rejected at the boundary, never
    /// reaching the analysis pipeline, per the error-taxonomy policy).
    pub fn from_candles(mut candles: Vec<Candle>) -> Self {
        candles.retain(Candle::is_valid);
        candles.sort_by_key(|c| c.timestamp);
        candles.dedup_by_key(|c| c.timestamp);
        Self {
            candles,
            ema_50: None,
            ema_200: None,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }

    pub fn current_price(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }

    /// Token age in hours, derived from first-to-last timestamp span.
    pub fn age_hours(&self) -> f64 {
        match (self.candles.first(), self.candles.last()) {
            (Some(first), Some(last)) => {
                (last.timestamp - first.timestamp) as f64 / 3_600.0
            }
            _ => 0.0,
        }
    }

    pub fn age_days(&self) -> f64 {
        self.age_hours() / 24.0
    }
}

/// A `<network>_<address>` pool identifier, split at the underscore.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolId(pub String);

impl PoolId {
    pub fn new(network: &str, address: &str) -> Self {
        Self(format!("{network}_{address}"))
    }

    /// Splits into `(network, address)`. Malformed pool ids (no
    /// underscore) are rejected at the boundary.
    pub fn parse(&self) -> Option<(&str, &str)> {
        self.0.split_once('_')
    }

    pub fn network(&self) -> Option<&str> {
        self.parse().map(|(n, _)| n)
    }

    pub fn address(&self) -> Option<&str> {
        self.parse().map(|(_, a)| a)
    }

    pub fn is_valid(&self) -> bool {
        self.parse().is_some_and(|(n, a)| !n.is_empty() && !a.is_empty())
    }
}

impl std::fmt::Display for PoolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candle_wick_body_invariant() {
        let good = Candle {
            timestamp: 1,
            open: 1.0,
            high: 1.2,
            low: 0.9,
            close: 1.1,
            volume: 10.0,
        };
        assert!(good.is_valid());

        let bad = Candle {
            timestamp: 1,
            open: 1.0,
            high: 0.95, // high below open
            low: 0.9,
            close: 1.1,
            volume: 10.0,
        };
        assert!(!bad.is_valid());
    }

    #[test]
    fn series_sorts_and_drops_invalid() {
        let c1 = Candle { timestamp: 2, open: 1.0, high: 1.1, low: 0.9, close: 1.0, volume: 1.0 };
        let c2 = Candle { timestamp: 1, open: 1.0, high: 1.1, low: 0.9, close: 1.0, volume: 1.0 };
        let bad = Candle { timestamp: 3, open: 1.0, high: 0.5, low: 0.9, close: 1.0, volume: -1.0 };

        let series = CandleSeries::from_candles(vec![c1, c2, bad]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.candles[0].timestamp, 1);
        assert_eq!(series.candles[1].timestamp, 2);
    }

    #[test]
    fn pool_id_splits_at_underscore() {
        let pool = PoolId::new("solana", "ABC123");
        assert_eq!(pool.network(), Some("solana"));
        assert_eq!(pool.address(), Some("ABC123"));
        assert!(pool.is_valid());

        let malformed = PoolId("no-underscore-here".to_string());
        assert!(!malformed.is_valid());
    }
}
