//! Pure, deterministic technical-indicator functions over price series.
//! No allocation-heavy state, no I/O: every function here is a candidate
//! for property tests against hand-computed fixtures.

/// Exponential moving average, smoothing `2/(span+1)`, seeded by the
/// first close so the output series has the same length as the input.
pub fn ema(series: &[f64], span: usize) -> Vec<f64> {
    if series.is_empty() || span == 0 {
        return Vec::new();
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(series.len());
    let mut prev = series[0];
    out.push(prev);
    for &value in &series[1..] {
        prev = alpha * value + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

/// Wilder-style RSI via rolling mean of gains and losses. Returns `None`
/// if there are fewer than `period + 1` closes.
pub fn rsi(series: &[f64], period: usize) -> Option<Vec<f64>> {
    if series.len() <= period || period == 0 {
        return None;
    }

    let mut gains = Vec::with_capacity(series.len() - 1);
    let mut losses = Vec::with_capacity(series.len() - 1);
    for w in series.windows(2) {
        let delta = w[1] - w[0];
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    let mut out = vec![f64::NAN; period];
    out.push(rsi_from_averages(avg_gain, avg_loss));

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period as f64 - 1.0) + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + losses[i]) / period as f64;
        out.push(rsi_from_averages(avg_gain, avg_loss));
    }

    Some(out)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Rolling mean of the true range `max(high-low, |high-prev_close|,
/// |low-prev_close|)`, one value shorter than the input (no true range
/// is defined for the first candle).
pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Option<Vec<f64>> {
    if highs.len() != lows.len() || highs.len() != closes.len() || highs.len() < 2 {
        return None;
    }

    let mut true_ranges = Vec::with_capacity(highs.len() - 1);
    for i in 1..highs.len() {
        let hl = highs[i] - lows[i];
        let hc = (highs[i] - closes[i - 1]).abs();
        let lc = (lows[i] - closes[i - 1]).abs();
        true_ranges.push(hl.max(hc).max(lc));
    }

    if true_ranges.len() < period {
        return None;
    }

    let mut out = Vec::with_capacity(true_ranges.len() - period + 1);
    let mut window_sum: f64 = true_ranges[..period].iter().sum();
    out.push(window_sum / period as f64);
    for i in period..true_ranges.len() {
        window_sum += true_ranges[i] - true_ranges[i - period];
        out.push(window_sum / period as f64);
    }
    Some(out)
}

/// Indices where `values[i]` is strictly greater than every value in its
/// `±order` window, if `find_max`, else strictly less.
pub fn local_extrema(values: &[f64], order: usize, find_max: bool) -> Vec<usize> {
    if order == 0 || values.len() <= 2 * order {
        return Vec::new();
    }

    let mut out = Vec::new();
    for i in order..values.len() - order {
        let candidate = values[i];
        let is_extreme = (i - order..=i + order)
            .filter(|&j| j != i)
            .all(|j| if find_max { candidate > values[j] } else { candidate < values[j] });
        if is_extreme {
            out.push(i);
        }
    }
    out
}

/// Williams-style 5-candle fractal indices: a high fractal at `i` beats
/// both neighbors on each side; a low fractal is the mirror image.
pub fn fractals(highs: &[f64], lows: &[f64], period: usize) -> (Vec<usize>, Vec<usize>) {
    let half = period / 2;
    if period == 0 || half == 0 || highs.len() != lows.len() || highs.len() < period {
        return (Vec::new(), Vec::new());
    }

    let mut high_fractals = Vec::new();
    let mut low_fractals = Vec::new();
    for i in half..highs.len() - half {
        let is_high = (i - half..=i + half).filter(|&j| j != i).all(|j| highs[i] > highs[j]);
        let is_low = (i - half..=i + half).filter(|&j| j != i).all(|j| lows[i] < lows[j]);
        if is_high {
            high_fractals.push(i);
        }
        if is_low {
            low_fractals.push(i);
        }
    }
    (high_fractals, low_fractals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_seeds_with_first_close() {
        let series = vec![10.0, 10.0, 10.0];
        let out = ema(&series, 9);
        assert_eq!(out[0], 10.0);
        assert!(out.iter().all(|&v| (v - 10.0).abs() < 1e-9));
    }

    #[test]
    fn rsi_is_100_for_monotonic_gains() {
        let series: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&series, 14).unwrap();
        assert_eq!(*out.last().unwrap(), 100.0);
    }

    #[test]
    fn atr_matches_hand_computed_two_candle_case() {
        let highs = vec![10.0, 11.0];
        let lows = vec![9.0, 9.5];
        let closes = vec![9.5, 10.5];
        let out = atr(&highs, &lows, &closes, 1).unwrap();
        // true range at i=1: max(1.5, |11-9.5|=1.5, |9.5-9.5|=0) = 1.5
        assert!((out[0] - 1.5).abs() < 1e-9);
    }

    #[test]
    fn local_extrema_finds_single_peak() {
        let values = vec![1.0, 2.0, 5.0, 2.0, 1.0];
        let peaks = local_extrema(&values, 2, true);
        assert_eq!(peaks, vec![2]);
    }

    #[test]
    fn fractals_detect_five_candle_pattern() {
        let highs = vec![1.0, 2.0, 3.0, 2.0, 1.0];
        let lows = vec![1.0, 0.5, 0.2, 0.5, 1.0];
        let (high_f, low_f) = fractals(&highs, &lows, 5);
        assert_eq!(high_f, vec![2]);
        assert_eq!(low_f, vec![2]);
    }
}
