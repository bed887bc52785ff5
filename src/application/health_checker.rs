use crate::domain::ports::HolderDeltas;
use crate::domain::token::TokenStatus;

const MIN_VOLUME_NEW: f64 = 100_000.0;
const MIN_VOLUME_ESTABLISHED: f64 = 300_000.0;
const MAX_ATH_DROP: f64 = 0.85;
const HOLDER_DROP_THRESHOLD_1H: f64 = -15.0;
const HOLDER_DROP_THRESHOLD_24H: f64 = -75.0;
const NEW_TOKEN_AGE_HOURS: f64 = 48.0;

/// Health verdict: a 0-100-ish score (penalties can push it negative),
/// a status derived from the score, and the human-readable reasons
/// that produced it.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub health_score: f64,
    pub status: TokenStatus,
    pub issues: Vec<String>,
}

/// Scores a token's liquidity/ATH-drop/holder-flow health. Pure given
/// its inputs: the same snapshot always yields the same report.
pub struct HealthChecker;

impl HealthChecker {
    pub fn check(
        ath: f64,
        current_price: f64,
        age_hours: f64,
        volume_24h: f64,
        holder_deltas: Option<HolderDeltas>,
    ) -> HealthReport {
        let mut score = 100.0;
        let mut issues = Vec::new();

        if ath > 0.0 {
            let drop_ratio = (ath - current_price) / ath;
            if drop_ratio > MAX_ATH_DROP {
                score -= 70.0;
                issues.push(format!("ATH drop {:.1}%", drop_ratio * 100.0));
            }
        }

        let min_volume_required = if age_hours < NEW_TOKEN_AGE_HOURS {
            MIN_VOLUME_NEW
        } else {
            MIN_VOLUME_ESTABLISHED
        };
        if volume_24h < min_volume_required {
            score -= 30.0;
            issues.push(format!(
                "Low volume ${volume_24h:.0} (needs >${min_volume_required:.0})"
            ));
        }

        if let Some(deltas) = holder_deltas {
            if let Some(h1) = deltas.one_hour {
                if h1 < HOLDER_DROP_THRESHOLD_1H {
                    score -= 25.0;
                    issues.push(format!("1h holder drop: {h1}"));
                }
            }
            if let Some(h24) = deltas.one_day {
                if h24 < HOLDER_DROP_THRESHOLD_24H {
                    score -= 40.0;
                    issues.push(format!("24h holder drop: {h24}"));
                }
            }
        }

        let status = if score < 20.0 {
            TokenStatus::Rugged
        } else if score < 50.0 {
            TokenStatus::Warning
        } else {
            TokenStatus::Active
        };

        HealthReport { health_score: score, status, issues }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severe_ath_drop_and_low_volume_rugs_the_token() {
        let report = HealthChecker::check(1.0, 0.10, 72.0, 50_000.0, None);
        assert!(report.health_score <= 0.0);
        assert_eq!(report.status, TokenStatus::Rugged);
        assert_eq!(report.issues.len(), 2);
    }

    #[test]
    fn healthy_established_token_stays_active() {
        let report = HealthChecker::check(1.0, 0.95, 500.0, 400_000.0, None);
        assert_eq!(report.status, TokenStatus::Active);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn new_token_gets_lower_volume_bar() {
        let report = HealthChecker::check(1.0, 0.95, 10.0, 150_000.0, None);
        assert_eq!(report.status, TokenStatus::Active);
    }

    #[test]
    fn holder_outflow_penalizes_independently() {
        let deltas = HolderDeltas { one_hour: Some(-20.0), one_day: Some(-100.0) };
        let report = HealthChecker::check(1.0, 0.99, 500.0, 400_000.0, Some(deltas));
        assert_eq!(report.health_score, 35.0);
        assert_eq!(report.status, TokenStatus::Warning);
    }
}
