use crate::domain::candle::Timeframe;

/// Picks the candle timeframe/aggregate pair to analyze a token at,
/// from a 1-hour, 500-candle probe. Total: every non-empty probe
/// resolves to a defined pair (falls back to `(hour, 4)` on failure).
pub struct TimeframeRouter;

impl TimeframeRouter {
    /// `daily_probe_len` is the candle count of a companion daily probe,
    /// used only in the long-history branch.
    pub fn pick(hourly_probe_len: usize, daily_probe_len: usize) -> (Timeframe, u32) {
        if hourly_probe_len == 0 {
            return (Timeframe::Hour, 4);
        }

        if hourly_probe_len >= 500 {
            return if daily_probe_len >= 90 {
                (Timeframe::Hour, 12)
            } else if daily_probe_len >= 30 {
                (Timeframe::Hour, 4)
            } else {
                (Timeframe::Hour, 1)
            };
        }

        let hours = hourly_probe_len as f64 / 24.0;
        if hours < 1.0 {
            (Timeframe::Minute, 5)
        } else if hours < 3.0 {
            (Timeframe::Minute, 15)
        } else {
            (Timeframe::Hour, 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_probe_fails_to_default() {
        assert_eq!(TimeframeRouter::pick(0, 0), (Timeframe::Hour, 4));
    }

    #[test]
    fn long_history_with_strong_daily_probe_routes_to_12h() {
        assert_eq!(TimeframeRouter::pick(500, 90), (Timeframe::Hour, 12));
    }

    #[test]
    fn long_history_with_weak_daily_probe_routes_to_1h() {
        assert_eq!(TimeframeRouter::pick(500, 10), (Timeframe::Hour, 1));
    }

    #[test]
    fn short_history_routes_by_hour_span() {
        assert_eq!(TimeframeRouter::pick(12, 0), (Timeframe::Minute, 5));
        assert_eq!(TimeframeRouter::pick(48, 0), (Timeframe::Minute, 15));
        assert_eq!(TimeframeRouter::pick(100, 0), (Timeframe::Hour, 1));
    }

    #[test]
    fn is_total_for_every_nonzero_probe() {
        for len in [1usize, 10, 50, 200, 499, 500, 501, 1000] {
            let (_, aggregate) = TimeframeRouter::pick(len, 0);
            assert!(aggregate > 0);
        }
    }
}
