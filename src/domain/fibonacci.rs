use std::collections::BTreeMap;

/// Fibonacci ratios and level prices over a lookback window.
///
/// Invariant: `price_range > 0`. For every ratio `r`,
/// `levels[r] = high_point - r * price_range` (tolerance 1e-9).
#[derive(Debug, Clone)]
pub struct FibonacciLevels {
    pub high_point: f64,
    pub low_point: f64,
    pub price_range: f64,
    /// ratio -> price, keyed by an ordered map so iteration is
    /// deterministic for tests and for rendering.
    pub levels: BTreeMap<FibRatio, f64>,
}

/// Wraps an `f64` ratio so it can key a `BTreeMap` (ratios are a small,
/// fixed set of literals, never computed, so bit-exact `Ord` is safe).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct FibRatio(pub f64);

impl Eq for FibRatio {}
impl Ord for FibRatio {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(std::cmp::Ordering::Equal)
    }
}

pub const RETRACEMENT_RATIOS_FULL: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];
pub const RETRACEMENT_RATIOS_SUB_30M: [f64; 5] = [0.0, 0.382, 0.5, 0.618, 1.0];
pub const EXTENSION_RATIOS: [f64; 4] = [1.272, 1.618, 2.0, 2.618];

/// Ratios and weights used by ZoneDetector's confluence scan.
pub const CONFLUENCE_RATIOS: [(f64, f64); 5] = [
    (0.236, 1.2),
    (0.382, 2.0),
    (0.5, 1.8),
    (0.618, 2.5),
    (0.786, 1.5),
];

impl FibonacciLevels {
    /// Computes retracement levels over the last `min(len, 400)` candles.
    /// `use_reduced_ratios` selects the 5-ratio set used on sub-30-minute
    /// frames (minute timeframe with aggregate < 30).
    pub fn calculate(highs: &[f64], lows: &[f64], use_reduced_ratios: bool) -> Option<Self> {
        if highs.is_empty() || lows.is_empty() || highs.len() != lows.len() {
            return None;
        }
        let lookback = highs.len().min(400);
        let start = highs.len() - lookback;
        let high_point = highs[start..].iter().cloned().fold(f64::MIN, f64::max);
        let low_point = lows[start..].iter().cloned().fold(f64::MAX, f64::min);
        let price_range = high_point - low_point;
        if price_range <= 0.0 {
            return None;
        }

        let ratios: &[f64] = if use_reduced_ratios {
            &RETRACEMENT_RATIOS_SUB_30M
        } else {
            &RETRACEMENT_RATIOS_FULL
        };

        let mut levels = BTreeMap::new();
        for &ratio in ratios {
            let price = high_point - price_range * ratio;
            levels.insert(FibRatio(ratio), price);
        }

        Some(Self {
            high_point,
            low_point,
            price_range,
            levels,
        })
    }

    /// Extension levels above `high_point`, priced with ratios in
    /// `{1.272, 1.618, 2.0, 2.618}`.
    pub fn calculate_extensions(&self) -> BTreeMap<FibRatio, f64> {
        EXTENSION_RATIOS
            .iter()
            .map(|&ratio| {
                let price = self.high_point + self.price_range * (ratio - 1.0);
                (FibRatio(ratio), price)
            })
            .collect()
    }

    pub fn price_at(&self, ratio: f64) -> Option<f64> {
        self.levels.get(&FibRatio(ratio)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retracement_round_trip_exact() {
        let highs = vec![1.0, 2.0, 3.0, 2.5, 2.0];
        let lows = vec![0.5, 1.0, 1.5, 1.2, 1.0];
        let fibs = FibonacciLevels::calculate(&highs, &lows, false).unwrap();

        for &ratio in &RETRACEMENT_RATIOS_FULL {
            let expected = fibs.high_point - ratio * fibs.price_range;
            let actual = fibs.price_at(ratio).unwrap();
            assert!((actual - expected).abs() < 1e-9, "ratio {ratio}: {actual} vs {expected}");
        }
    }

    #[test]
    fn reduced_ratio_set_on_sub_30m() {
        let highs = vec![1.0, 2.0];
        let lows = vec![0.5, 1.0];
        let fibs = FibonacciLevels::calculate(&highs, &lows, true).unwrap();
        assert_eq!(fibs.levels.len(), 5);
        assert!(fibs.price_at(0.236).is_none());
    }

    #[test]
    fn rejects_zero_range() {
        let highs = vec![1.0, 1.0];
        let lows = vec![1.0, 1.0];
        assert!(FibonacciLevels::calculate(&highs, &lows, false).is_none());
    }

    #[test]
    fn extensions_are_above_high_point() {
        let highs = vec![1.0, 2.0];
        let lows = vec![0.5, 1.0];
        let fibs = FibonacciLevels::calculate(&highs, &lows, false).unwrap();
        let ext = fibs.calculate_extensions();
        for (_, price) in ext {
            assert!(price > fibs.high_point);
        }
    }
}
