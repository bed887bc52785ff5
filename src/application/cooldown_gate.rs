use crate::domain::alert::{AlertRecord, Signal, SignalKind};
use crate::domain::errors::PersistenceError;
use crate::domain::repositories::AlertHistoryRepository;

const GEM_PRICE_CHANGE_THRESHOLD: f64 = 0.10;
const GEM_MIN_COOLDOWN_HOURS: f64 = 0.5;
const SUPPORT_PRICE_CHANGE_THRESHOLD: f64 = 0.08;
const SUPPORT_MIN_COOLDOWN_HOURS: f64 = 1.0;
const DEFAULT_PRICE_CHANGE_THRESHOLD: f64 = 0.09;
const DEFAULT_MIN_COOLDOWN_HOURS: f64 = 2.0;
const LEVEL_PROXIMITY_TOLERANCE: f64 = 0.005;
const MIN_CONFIDENCE: f64 = 7.0;

struct CooldownThresholds {
    price_change: f64,
    min_cooldown_hours: f64,
}

fn thresholds_for(kind: SignalKind) -> CooldownThresholds {
    match kind {
        SignalKind::GemEarlyMomentum | SignalKind::GemVolumeSpike => CooldownThresholds {
            price_change: GEM_PRICE_CHANGE_THRESHOLD,
            min_cooldown_hours: GEM_MIN_COOLDOWN_HOURS,
        },
        k if k.is_support_family() => CooldownThresholds {
            price_change: SUPPORT_PRICE_CHANGE_THRESHOLD,
            min_cooldown_hours: SUPPORT_MIN_COOLDOWN_HOURS,
        },
        _ => CooldownThresholds {
            price_change: DEFAULT_PRICE_CHANGE_THRESHOLD,
            min_cooldown_hours: DEFAULT_MIN_COOLDOWN_HOURS,
        },
    }
}

/// Signal kinds that bypass the confidence-score filter outright,
/// because a breakout or confirmed retest is definitionally confident.
fn is_always_confident(kind: SignalKind) -> bool {
    matches!(kind, SignalKind::PullbackRetest | SignalKind::ResistanceBreakout)
}

/// Decides whether a candidate Signal duplicates a recently-delivered
/// one closely enough to suppress. `now` is injected so tests (and a
/// future mock clock) can control elapsed time deterministically.
pub struct CooldownGate<'a> {
    history: &'a dyn AlertHistoryRepository,
}

impl<'a> CooldownGate<'a> {
    pub fn new(history: &'a dyn AlertHistoryRepository) -> Self {
        Self { history }
    }

    pub async fn should_suppress(&self, signal: &Signal, now: i64) -> Result<bool, PersistenceError> {
        if signal.confidence_score < MIN_CONFIDENCE && !is_always_confident(signal.kind) {
            return Ok(true);
        }

        let key = signal.cooldown_key();
        let Some(previous) = self.history.most_recent_for_key(&key).await? else {
            return Ok(false);
        };

        Ok(is_duplicate(&previous, signal, now))
    }
}

fn is_duplicate(previous: &AlertRecord, signal: &Signal, now: i64) -> bool {
    let thresholds = thresholds_for(signal.kind);
    let elapsed_hours = (now - previous.sent_at) as f64 / 3_600.0;
    if elapsed_hours < 0.0 {
        return true;
    }

    if signal.kind.is_gem_family() {
        return elapsed_hours < thresholds.min_cooldown_hours;
    }

    let level = signal.zone_price.unwrap_or(signal.price);
    if previous.zone_price.is_none_or(|recorded| !within_proximity(level, recorded)) {
        return false;
    }

    let price_change = if previous.price_at_alert > 0.0 {
        ((signal.price - previous.price_at_alert) / previous.price_at_alert).abs()
    } else {
        0.0
    };

    elapsed_hours < thresholds.min_cooldown_hours && price_change < thresholds.price_change
}

fn within_proximity(level: f64, recorded: f64) -> bool {
    if recorded <= 0.0 {
        return false;
    }
    ((level - recorded) / recorded).abs() <= LEVEL_PROXIMITY_TOLERANCE
}
