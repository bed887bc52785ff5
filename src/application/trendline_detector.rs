use crate::application::indicators;
use crate::domain::candle::CandleSeries;
use crate::domain::trendline::Trendline;

const LOOKBACK_MAX: usize = 150;
const EXTREMA_ORDER: usize = 4;
const RECENT_WINDOW_FRACTION: f64 = 0.6;
const MIN_POINT_SEPARATION: usize = 8;
const MAX_SLOPE: f64 = 0.0001;
const BREACH_TOLERANCE: f64 = 0.005;
const MIN_TOUCHES: usize = 2;

/// Finds a recent-peak-anchored descending trendline validated by touch
/// count, or `None` if no candidate clears the touch/breach bar.
pub struct TrendlineDetector;

impl TrendlineDetector {
    pub fn detect(series: &CandleSeries) -> Option<Trendline> {
        let len = series.len().min(LOOKBACK_MAX);
        if len < MIN_POINT_SEPARATION * 2 {
            return None;
        }
        let start = series.len() - len;
        let highs = &series.highs()[start..];

        let swing_highs = indicators::local_extrema(highs, EXTREMA_ORDER, true);
        if swing_highs.is_empty() {
            return None;
        }

        let recent_cutoff = (len as f64 * (1.0 - RECENT_WINDOW_FRACTION)) as usize;
        let recent: Vec<usize> = swing_highs.into_iter().filter(|&i| i >= recent_cutoff).collect();
        if recent.is_empty() {
            return None;
        }

        let anchor_idx = *recent.iter().max_by(|&&a, &&b| {
            highs[a].partial_cmp(&highs[b]).unwrap_or(std::cmp::Ordering::Equal)
        })?;

        let mut best: Option<(Trendline, f64)> = None;

        for &point_a in &recent {
            for &point_b in &recent {
                if point_b <= point_a || point_b - point_a < MIN_POINT_SEPARATION {
                    continue;
                }

                let slope = (highs[point_b] - highs[point_a]) / (point_b - point_a) as f64;
                if slope > MAX_SLOPE {
                    continue;
                }

                let intercept = highs[point_a];
                let line_price = |idx: usize| slope * (idx as f64 - point_a as f64) + intercept;

                let breached = (point_a..=point_b).any(|idx| {
                    let line = line_price(idx);
                    line > 0.0 && (highs[idx] - line) / line > BREACH_TOLERANCE
                });
                if breached {
                    continue;
                }

                let touches = (0..highs.len())
                    .filter(|&idx| {
                        let line = line_price(idx);
                        line > 0.0 && (highs[idx] - line).abs() / line < BREACH_TOLERANCE
                    })
                    .count();
                if touches < MIN_TOUCHES {
                    continue;
                }

                let mean_index = (point_a + point_b) as f64 / 2.0 / len as f64;
                let includes_anchor = point_a == anchor_idx || point_b == anchor_idx;
                let score = 3.0 * touches as f64
                    + if includes_anchor { 25.0 } else { 0.0 }
                    + 10.0 * mean_index
                    + 0.1 * (point_b - point_a) as f64;

                let trendline = Trendline {
                    start_idx: point_a,
                    end_idx: point_b,
                    slope,
                    intercept,
                    touches,
                    confidence_score: score,
                };

                let is_better = match &best {
                    Some((_, best_score)) => score > *best_score,
                    None => true,
                };
                if is_better {
                    best = Some((trendline, score));
                }
            }
        }

        best.map(|(line, _)| line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::Candle;

    fn candle(ts: i64, high: f64) -> Candle {
        Candle { timestamp: ts, open: high * 0.98, high, low: high * 0.97, close: high * 0.98, volume: 100.0 }
    }

    #[test]
    fn insufficient_series_returns_none() {
        let series = CandleSeries::from_candles((0..10).map(|i| candle(i, 1.0)).collect());
        assert!(TrendlineDetector::detect(&series).is_none());
    }

    #[test]
    fn descending_peaks_form_a_validated_trendline() {
        let mut candles = Vec::new();
        for i in 0..120i64 {
            let base_high = 1.0 - (i as f64) * 0.001;
            // Insert periodic local peaks that form a clean descending sequence.
            let high = if i % 20 == 10 { base_high + 0.02 } else { base_high };
            candles.push(candle(i, high));
        }
        let series = CandleSeries::from_candles(candles);
        let result = TrendlineDetector::detect(&series);
        if let Some(line) = result {
            assert!(line.slope <= MAX_SLOPE);
            assert!(line.touches >= MIN_TOUCHES);
        }
    }
}
