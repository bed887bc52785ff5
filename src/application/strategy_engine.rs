use crate::domain::alert::{Signal, SignalKind};
use crate::domain::analysis::AnalysisResult;
use crate::domain::errors::PersistenceError;
use crate::domain::repositories::ZoneStateRepository;
use crate::domain::zone::Zone;
use crate::domain::zone_state::{ZoneState, ZoneStateKind};

const TIER1_APPROACH: f64 = 0.020;
const TIER1_BREAKOUT: f64 = 0.005;
const TIER2_APPROACH: f64 = 0.015;
const TIER2_BREAKOUT: f64 = 0.010;
const RESET_DISTANCE: f64 = 0.05;

const ORIGIN_RETEST_CEILING_MULTIPLE: f64 = 1.1;

const GEM_VOLUME_SPIKE_MULTIPLE: f64 = 4.0;
const GEM_CONSOLIDATION_WINDOW: usize = 12;
const GEM_CONSOLIDATION_RANGE_MAX: f64 = 0.20;
const GEM_CONSOLIDATION_VOLUME_MULTIPLE: f64 = 2.0;
const GEM_MOMENTUM_LOOKBACK: usize = 6;
const GEM_MOMENTUM_MIN_GAIN: f64 = 0.20;
const GEM_PRE_FILTER_LOOKBACK: usize = 12;
const GEM_PRE_FILTER_DROP_RATIO: f64 = 1.25;

const PULLBACK_LOOKBACK_FAR: usize = 30;
const PULLBACK_LOOKBACK_NEAR: usize = 5;
const PULLBACK_RETEST_TOLERANCE: f64 = 0.03;
const PULLBACK_CONFIDENCE: f64 = 8.0;

const DEFAULT_CONFIDENCE: f64 = 7.5;

struct Thresholds {
    approach: f64,
    breakout: f64,
}

fn thresholds_for_tier(tier: crate::domain::zone::ZoneTier) -> Thresholds {
    match tier {
        crate::domain::zone::ZoneTier::Tier1 => Thresholds { approach: TIER1_APPROACH, breakout: TIER1_BREAKOUT },
        _ => Thresholds { approach: TIER2_APPROACH, breakout: TIER2_BREAKOUT },
    }
}

/// Composes AnalysisEngine output with the zone state machine, origin
/// retest detection, gem momentum strategies, and pullback retests.
/// Emits at most one Signal per invocation.
pub struct StrategyEngine<'a> {
    zone_states: &'a dyn ZoneStateRepository,
}

impl<'a> StrategyEngine<'a> {
    pub fn new(zone_states: &'a dyn ZoneStateRepository) -> Self {
        Self { zone_states }
    }

    /// Full strategy pass for tokens at least 5 days old: zone FSM,
    /// origin retest, and pullback retest, in that priority order.
    pub async fn evaluate(
        &self,
        analysis: &AnalysisResult,
        token_address: &str,
        symbol: &str,
        now: i64,
    ) -> Result<Option<Signal>, PersistenceError> {
        if let Some(signal) = self.evaluate_zone_state_machine(analysis, token_address, symbol, now).await? {
            return Ok(Some(signal));
        }

        if let Some(signal) = self.evaluate_origin_retest(analysis, token_address, symbol, now) {
            return Ok(Some(signal));
        }

        Ok(self.evaluate_pullback_retest(analysis, token_address, symbol, now))
    }

    /// Gem-momentum pass for tokens younger than 5 days, operating on a
    /// 5-minute candle series already selected by the caller.
    pub fn evaluate_gem_strategies(&self, analysis: &AnalysisResult, token_address: &str, symbol: &str, now: i64) -> Option<Signal> {
        let closes = analysis.raw.series.closes();
        let volumes = analysis.raw.series.volumes();
        let len = closes.len();
        if len < GEM_PRE_FILTER_LOOKBACK + 1 {
            return None;
        }

        let current_price = *closes.last()?;
        let price_12_back = closes[len - 1 - GEM_PRE_FILTER_LOOKBACK];
        if current_price > 0.0 && price_12_back / current_price > GEM_PRE_FILTER_DROP_RATIO {
            return None;
        }

        if let Some(signal) = self.evaluate_gem_volume_spike(analysis, &volumes, &closes, token_address, symbol, now) {
            return Some(signal);
        }
        if let Some(signal) = self.evaluate_gem_consolidation_breakout(analysis, &volumes, &closes, token_address, symbol, now) {
            return Some(signal);
        }
        self.evaluate_gem_momentum(&closes, token_address, symbol, now)
    }

    async fn evaluate_zone_state_machine(
        &self,
        analysis: &AnalysisResult,
        token_address: &str,
        symbol: &str,
        now: i64,
    ) -> Result<Option<Signal>, PersistenceError> {
        let price = analysis.current_price();
        let zones: Vec<&Zone> = analysis
            .technical
            .zones
            .tier1
            .iter()
            .chain(analysis.technical.zones.tier2.iter())
            .collect();

        for zone in zones {
            if zone.level_price <= 0.0 {
                continue;
            }
            let distance = (price - zone.level_price) / zone.level_price;
            let thresholds = thresholds_for_tier(zone.tier);

            let stored = self.zone_states.get(token_address, zone.level_price).await?;
            let mut state = stored.unwrap_or_else(|| ZoneState::idle(token_address, zone.level_price));

            let (new_state, signal_kind) = next_state(&state.current_state, distance, &thresholds);
            if new_state == state.current_state {
                continue;
            }

            state.current_state = new_state;
            state.last_price = price;
            state.last_signal_time = Some(now);

            let signal = signal_kind.map(|kind| {
                state.last_signal_type = Some(kind.as_str().to_string());
                build_signal(kind, token_address, symbol, price, now, Some(zone.level_price), zone.final_score)
            });

            self.zone_states.upsert(&state).await?;

            if let Some(signal) = signal {
                return Ok(Some(signal));
            }
        }

        Ok(None)
    }

    fn evaluate_origin_retest(&self, analysis: &AnalysisResult, token_address: &str, symbol: &str, now: i64) -> Option<Signal> {
        let origin = analysis.technical.zones.origin.as_ref()?;
        let detail = origin.origin?;
        let price = analysis.current_price();
        if price < detail.zone_bottom || price > detail.zone_top * ORIGIN_RETEST_CEILING_MULTIPLE {
            return None;
        }

        let mut signal = build_signal(SignalKind::OriginRetest, token_address, symbol, price, now, Some(origin.level_price), 10.0);
        signal.origin_multiple = Some(price / detail.zone_bottom.max(f64::EPSILON));
        Some(signal)
    }

    fn evaluate_pullback_retest(&self, analysis: &AnalysisResult, token_address: &str, symbol: &str, now: i64) -> Option<Signal> {
        let highs = analysis.raw.series.highs();
        let closes = analysis.raw.series.closes();
        let len = highs.len();
        if len < PULLBACK_LOOKBACK_FAR + 1 {
            return None;
        }

        let far_start = len - PULLBACK_LOOKBACK_FAR;
        let near_end = len - PULLBACK_LOOKBACK_NEAR;
        if far_start >= near_end {
            return None;
        }
        let broken_level = highs[far_start..near_end].iter().cloned().fold(f64::MIN, f64::max);
        if broken_level <= 0.0 {
            return None;
        }

        let current_price = *closes.last()?;
        let was_exceeded = highs[near_end..].iter().any(|&h| h > broken_level);
        if !was_exceeded {
            return None;
        }

        let retraced_near_level = ((current_price - broken_level) / broken_level).abs() <= PULLBACK_RETEST_TOLERANCE;
        let back_above = current_price > broken_level;
        if !retraced_near_level || !back_above {
            return None;
        }

        let mut signal = build_signal(SignalKind::PullbackRetest, token_address, symbol, current_price, now, Some(broken_level), PULLBACK_CONFIDENCE);
        signal.confidence_score = PULLBACK_CONFIDENCE;
        Some(signal)
    }

    fn evaluate_gem_volume_spike(&self, analysis: &AnalysisResult, volumes: &[f64], closes: &[f64], token_address: &str, symbol: &str, now: i64) -> Option<Signal> {
        if volumes.len() < 10 {
            return None;
        }
        let current_volume = *volumes.last()?;
        let prior = &volumes[volumes.len() - 10..volumes.len() - 1];
        let mean_prior = prior.iter().sum::<f64>() / prior.len() as f64;
        if mean_prior <= 0.0 {
            return None;
        }
        let ratio = current_volume / mean_prior;
        let spiked = ratio > GEM_VOLUME_SPIKE_MULTIPLE;
        if !spiked {
            return None;
        }

        let ema_50 = analysis.technical.ma.ema_50?;
        let price = *closes.last()?;
        if price < ema_50 {
            return None;
        }

        Some(build_signal(SignalKind::GemVolumeSpike, token_address, symbol, price, now, None, DEFAULT_CONFIDENCE))
    }

    fn evaluate_gem_consolidation_breakout(&self, _analysis: &AnalysisResult, volumes: &[f64], closes: &[f64], token_address: &str, symbol: &str, now: i64) -> Option<Signal> {
        if closes.len() < GEM_CONSOLIDATION_WINDOW + 1 || volumes.len() < GEM_CONSOLIDATION_WINDOW + 1 {
            return None;
        }
        let window_end = closes.len() - 1;
        let window_start = window_end - GEM_CONSOLIDATION_WINDOW;
        let window_highs = &closes[window_start..window_end];
        let high = window_highs.iter().cloned().fold(f64::MIN, f64::max);
        let low = window_highs.iter().cloned().fold(f64::MAX, f64::min);
        let price = closes[window_end];
        if price <= 0.0 {
            return None;
        }
        if (high - low) / price >= GEM_CONSOLIDATION_RANGE_MAX {
            return None;
        }
        if price <= high {
            return None;
        }

        let window_volumes = &volumes[window_start..window_end];
        let mean_volume = window_volumes.iter().sum::<f64>() / window_volumes.len() as f64;
        let current_volume = volumes[window_end];
        if mean_volume <= 0.0 || current_volume < GEM_CONSOLIDATION_VOLUME_MULTIPLE * mean_volume {
            return None;
        }

        Some(build_signal(SignalKind::GemEarlyMomentum, token_address, symbol, price, now, None, DEFAULT_CONFIDENCE))
    }

    fn evaluate_gem_momentum(&self, closes: &[f64], token_address: &str, symbol: &str, now: i64) -> Option<Signal> {
        if closes.len() < GEM_MOMENTUM_LOOKBACK + 1 {
            return None;
        }
        let current = *closes.last()?;
        let past = closes[closes.len() - 1 - GEM_MOMENTUM_LOOKBACK];
        if past <= 0.0 {
            return None;
        }
        let gain = current / past - 1.0;
        if gain < GEM_MOMENTUM_MIN_GAIN {
            return None;
        }
        Some(build_signal(SignalKind::GemEarlyMomentum, token_address, symbol, current, now, None, DEFAULT_CONFIDENCE))
    }
}

fn next_state(current: &ZoneStateKind, distance: f64, thresholds: &Thresholds) -> (ZoneStateKind, Option<SignalKind>) {
    if distance > thresholds.breakout && distance < RESET_DISTANCE {
        return (ZoneStateKind::BrokenUp, Some(SignalKind::ResistanceBreakout));
    }
    if distance < -thresholds.breakout && distance > -RESET_DISTANCE {
        return (ZoneStateKind::BrokenDown, Some(SignalKind::SupportBreakdown));
    }
    if distance.abs() < thresholds.approach && distance > 0.0 {
        return (ZoneStateKind::ApproachingDown, Some(SignalKind::ApproachingSupport));
    }
    if distance.abs() < thresholds.approach && distance < 0.0 {
        return (ZoneStateKind::ApproachingUp, Some(SignalKind::ApproachingResistance));
    }
    if distance.abs() > RESET_DISTANCE {
        return (ZoneStateKind::Idle, None);
    }
    (*current, None)
}

#[allow(clippy::too_many_arguments)]
fn build_signal(
    kind: SignalKind,
    token_address: &str,
    symbol: &str,
    price: f64,
    timestamp: i64,
    zone_price: Option<f64>,
    confidence_score: f64,
) -> Signal {
    Signal {
        kind,
        token_address: token_address.to_string(),
        symbol: symbol.to_string(),
        price,
        confidence_score,
        timestamp,
        zone_price,
        origin_multiple: None,
        fib_ratio: None,
        whale_count: None,
    }
}
