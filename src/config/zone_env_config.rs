//! Zone-scoring tunables parsed from environment variables.
//!
//! These mirror the knobs the upstream scoring surface exposed
//! (`ZONE_SCORE_MIN`, `PROXIMITY_THRESHOLD`, `FIBONACCI_TOLERANCE`), kept
//! here for operator familiarity and surfaced on [`crate::config::Config`].
//! The zone scorer and confluence pass (`application::zone_detector`) use
//! their own fixed thresholds rather than reading this struct — the one
//! code path that consumed these values, a secondary confluence check
//! independent of the per-zone state machine, was dropped as redundant
//! with `StrategyEngine`'s zone-state-machine signals.

use std::env;

use super::parse_env_or;

#[derive(Debug, Clone)]
pub struct ZoneEnvConfig {
    pub zone_score_min: f64,
    pub proximity_threshold: f64,
    pub fibonacci_tolerance: f64,
}

impl Default for ZoneEnvConfig {
    fn default() -> Self {
        Self { zone_score_min: 2.0, proximity_threshold: 0.08, fibonacci_tolerance: 0.02 }
    }
}

impl ZoneEnvConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            zone_score_min: parse_env_or("ZONE_SCORE_MIN", default.zone_score_min),
            proximity_threshold: parse_env_or("PROXIMITY_THRESHOLD", default.proximity_threshold),
            fibonacci_tolerance: parse_env_or("FIBONACCI_TOLERANCE", default.fibonacci_tolerance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = ZoneEnvConfig::default();
        assert_eq!(cfg.zone_score_min, 2.0);
        assert_eq!(cfg.proximity_threshold, 0.08);
        assert_eq!(cfg.fibonacci_tolerance, 0.02);
    }
}
