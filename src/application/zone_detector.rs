use crate::application::indicators;
use crate::domain::candle::{CandleSeries, Timeframe};
use crate::domain::fibonacci::{FibonacciLevels, CONFLUENCE_RATIOS};
use crate::domain::zone::{Zone, ZoneKind};

const ORIGIN_CONSOLIDATION_MIN: usize = 20;
const ORIGIN_RANGE_MAX: f64 = 0.5;
const ORIGIN_PUMP_MIN: f64 = 0.5;
const MIN_ZONE_SCORE: f64 = 1.5;
const DEDUPE_PROXIMITY: f64 = 0.03;
const TOUCH_TOLERANCE: f64 = 0.005;
const MAX_ZONES_PER_SIDE: usize = 3;

const WEIGHT_TOUCHES: f64 = 0.30;
const WEIGHT_REACTION: f64 = 0.25;
const WEIGHT_VOLUME: f64 = 0.20;
const WEIGHT_SR_FLIP: f64 = 0.15;

const NEW_TOKEN_AGE_HOURS: f64 = 48.0;
const NEW_TOKEN_CONFLUENCE_TOLERANCE: f64 = 0.10;
const STANDARD_CONFLUENCE_TOLERANCE: f64 = 0.035;

/// Result of a single ZoneDetector pass: up to three supply and three
/// demand swing zones, plus an optional origin zone for young tokens.
#[derive(Debug, Clone, Default)]
pub struct ZoneDetection {
    pub supply: Vec<Zone>,
    pub demand: Vec<Zone>,
    pub origin: Option<Zone>,
}

/// Detects supply/demand swing zones and, for young tokens, an origin
/// zone, then scores every zone for Fibonacci confluence.
pub struct ZoneDetector;

impl ZoneDetector {
    pub fn detect(series: &CandleSeries, timeframe: Timeframe, aggregate: u32) -> ZoneDetection {
        if series.len() < 30 {
            return ZoneDetection::default();
        }

        let highs = series.highs();
        let lows = series.lows();
        let closes = series.closes();
        let volumes = series.volumes();

        let Some(atr) = indicators::atr(&highs, &lows, &closes, 14) else {
            return ZoneDetection::default();
        };
        let avg_atr = atr.iter().sum::<f64>() / atr.len() as f64;
        if avg_atr <= 0.0 {
            return ZoneDetection::default();
        }

        let avg_volume = volumes.iter().sum::<f64>() / volumes.len() as f64;
        let order = extrema_order(timeframe, aggregate, series.len());
        let margin = (5usize).min(series.len() / 4);

        let mut supply = collect_zones(
            &indicators::local_extrema(&highs, order, true),
            &highs,
            &closes,
            &volumes,
            avg_volume,
            avg_atr,
            series.len(),
            margin,
            ZoneKind::Supply,
        );
        let mut demand = collect_zones(
            &indicators::local_extrema(&lows, order, false),
            &lows,
            &closes,
            &volumes,
            avg_volume,
            avg_atr,
            series.len(),
            margin,
            ZoneKind::Demand,
        );

        let age_hours = series.age_hours();
        let fibs = FibonacciLevels::calculate(&highs, &lows, is_sub_30m(timeframe, aggregate));
        apply_confluence(&mut supply, fibs.as_ref(), age_hours);
        apply_confluence(&mut demand, fibs.as_ref(), age_hours);

        dedupe_and_truncate(&mut supply);
        dedupe_and_truncate(&mut demand);

        let origin = find_origin_zone(series);

        ZoneDetection { supply, demand, origin }
    }
}

fn extrema_order(timeframe: Timeframe, aggregate: u32, len: usize) -> usize {
    if timeframe == Timeframe::Minute {
        if aggregate <= 5 {
            return 2;
        }
        if aggregate <= 15 {
            return 3;
        }
    }
    if len < 100 {
        3
    } else {
        5
    }
}

fn is_sub_30m(timeframe: Timeframe, aggregate: u32) -> bool {
    timeframe == Timeframe::Minute && aggregate < 30
}

#[allow(clippy::too_many_arguments)]
fn collect_zones(
    candidate_indices: &[usize],
    level_values: &[f64],
    closes: &[f64],
    volumes: &[f64],
    avg_volume: f64,
    avg_atr: f64,
    len: usize,
    margin: usize,
    kind: ZoneKind,
) -> Vec<Zone> {
    let min_touches = if len < 100 { 1 } else { 2 };
    let mut zones = Vec::new();

    for &idx in candidate_indices {
        if idx < margin || idx + margin >= len {
            continue;
        }
        let level_price = level_values[idx];
        if level_price <= 0.0 {
            continue;
        }

        let mut touches = 0usize;
        let mut reactions = Vec::new();
        for i in 0..len {
            if ((level_values[i] - level_price) / level_price).abs() < TOUCH_TOLERANCE {
                touches += 1;
                if i + 5 < len {
                    reactions.push((closes[i + 5] - level_price).abs() / avg_atr);
                }
            }
        }

        if touches < min_touches {
            continue;
        }

        let mean_reaction = if reactions.is_empty() {
            0.0
        } else {
            reactions.iter().sum::<f64>() / reactions.len() as f64
        };
        let volume_ratio = if avg_volume > 0.0 { volumes[idx] / avg_volume } else { 1.0 };

        let score = (touches as f64).min(10.0) * WEIGHT_TOUCHES
            + mean_reaction.min(10.0) * WEIGHT_REACTION
            + volume_ratio.min(10.0) * WEIGHT_VOLUME
            + if touches > 3 { 3.0 * WEIGHT_SR_FLIP } else { 0.0 };

        if score < MIN_ZONE_SCORE {
            continue;
        }

        zones.push(Zone::new_swing(kind, level_price, score, touches, Vec::new(), 0.0));
    }

    zones
}

fn apply_confluence(zones: &mut [Zone], fibs: Option<&FibonacciLevels>, age_hours: f64) {
    let Some(fibs) = fibs else { return };
    let is_new_token = age_hours < NEW_TOKEN_AGE_HOURS;
    let tolerance = if is_new_token { NEW_TOKEN_CONFLUENCE_TOLERANCE } else { STANDARD_CONFLUENCE_TOLERANCE };

    for zone in zones.iter_mut() {
        let mut bonus = 0.0;
        let mut matched = Vec::new();
        for &(ratio, weight) in &CONFLUENCE_RATIOS {
            if let Some(fib_price) = fibs.price_at(ratio) {
                if ((zone.level_price - fib_price) / zone.level_price).abs() < tolerance {
                    bonus += weight;
                    matched.push(ratio);
                }
            }
        }

        zone.matched_fibs = matched;
        zone.confluence_bonus = bonus;
        zone.final_score = zone.score + bonus;
        zone.tier = crate::domain::zone::tier_for_score(zone.final_score);

        if is_new_token && zone.score >= 1.0 && bonus > 0.0 {
            zone.promote_one_tier();
        }
    }
}

fn dedupe_and_truncate(zones: &mut Vec<Zone>) {
    zones.sort_by(|a, b| b.final_score.partial_cmp(&a.final_score).unwrap_or(std::cmp::Ordering::Equal));
    let mut kept: Vec<Zone> = Vec::new();
    for zone in zones.drain(..) {
        let too_close = kept
            .iter()
            .any(|k| ((zone.level_price - k.level_price) / zone.level_price).abs() < DEDUPE_PROXIMITY);
        if !too_close {
            kept.push(zone);
        }
        if kept.len() >= MAX_ZONES_PER_SIDE {
            break;
        }
    }
    *zones = kept;
}

fn find_origin_zone(series: &CandleSeries) -> Option<Zone> {
    if series.age_days() > 30.0 || series.len() > 500 || series.len() < ORIGIN_CONSOLIDATION_MIN {
        return None;
    }

    let lows = series.lows();
    let highs = series.highs();
    let lowest_idx = lows
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))?
        .0;

    let consolidation_end = (lowest_idx + ORIGIN_CONSOLIDATION_MIN).min(lows.len() - 1);
    let window_len = consolidation_end - lowest_idx;
    if window_len < 10 {
        return None;
    }

    let range_high = highs[lowest_idx..consolidation_end].iter().cloned().fold(f64::MIN, f64::max);
    let range_low = lows[lowest_idx..consolidation_end].iter().cloned().fold(f64::MAX, f64::min);
    if range_low <= 0.0 {
        return None;
    }
    let range_percent = (range_high - range_low) / range_low;

    if consolidation_end >= series.len() - 1 {
        return None;
    }
    let max_price_after = highs[consolidation_end..].iter().cloned().fold(f64::MIN, f64::max);
    if range_high <= 0.0 {
        return None;
    }
    let pump_percent = (max_price_after - range_high) / range_high;

    if range_percent <= ORIGIN_RANGE_MAX && pump_percent >= ORIGIN_PUMP_MIN {
        Some(Zone::new_origin(range_low, range_high, pump_percent, window_len))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::Candle;

    fn flat_series(len: usize, price: f64, volume: f64) -> CandleSeries {
        let candles = (0..len)
            .map(|i| Candle {
                timestamp: i as i64 * 3600,
                open: price,
                high: price,
                low: price,
                close: price,
                volume,
            })
            .collect();
        CandleSeries::from_candles(candles)
    }

    #[test]
    fn too_short_series_yields_no_zones() {
        let series = flat_series(10, 1.0, 100.0);
        let detection = ZoneDetector::detect(&series, Timeframe::Hour, 1);
        assert!(detection.supply.is_empty());
        assert!(detection.demand.is_empty());
        assert!(detection.origin.is_none());
    }

    #[test]
    fn breakout_fixture_produces_a_resistance_zone() {
        // A 100-candle series with a clear repeated swing high at 1.000.
        let mut candles = Vec::new();
        for i in 0..100 {
            let base = 0.95 + 0.01 * ((i % 7) as f64 / 7.0);
            let is_peak = i % 10 == 5;
            let high = if is_peak { 1.000 } else { base };
            candles.push(Candle {
                timestamp: i as i64 * 3600,
                open: base,
                high,
                low: base - 0.01,
                close: base,
                volume: 1000.0,
            });
        }
        let series = CandleSeries::from_candles(candles);
        let detection = ZoneDetector::detect(&series, Timeframe::Hour, 1);
        assert!(!detection.supply.is_empty() || !detection.demand.is_empty());
    }

    #[test]
    fn origin_zone_detected_for_young_pumping_token() {
        let mut candles = Vec::new();
        for i in 0..25 {
            let jitter = 0.009 + 0.003 * ((i % 3) as f64 / 3.0);
            candles.push(Candle {
                timestamp: i as i64 * 900,
                open: jitter,
                high: jitter * 1.02,
                low: 0.009,
                close: jitter,
                volume: 500.0,
            });
        }
        for i in 25..60 {
            let price = 0.012 + 0.018 * ((i - 25) as f64 / 35.0);
            candles.push(Candle {
                timestamp: i as i64 * 900,
                open: price,
                high: price * 1.01,
                low: price * 0.99,
                close: price,
                volume: 800.0,
            });
        }
        let series = CandleSeries::from_candles(candles);
        let detection = ZoneDetector::detect(&series, Timeframe::Minute, 15);
        assert!(detection.origin.is_some());
        let origin = detection.origin.unwrap();
        assert!(origin.is_origin);
        assert_eq!(origin.final_score, 10.0);
    }

    #[test]
    fn confluence_promotes_score_and_tier() {
        let mut zone = Zone::new_swing(ZoneKind::Supply, 1.000, 2.5, 3, Vec::new(), 0.0);
        let fibs = FibonacciLevels {
            high_point: 1.010,
            low_point: 0.9,
            price_range: 0.110,
            levels: {
                let mut m = std::collections::BTreeMap::new();
                m.insert(crate::domain::fibonacci::FibRatio(0.618), 1.005);
                m
            },
        };
        apply_confluence(std::slice::from_mut(&mut zone), Some(&fibs), 100.0 * 24.0);
        assert_eq!(zone.matched_fibs, vec![0.618]);
        assert_eq!(zone.confluence_bonus, 2.5);
        assert_eq!(zone.final_score, 5.0);
    }
}
