use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    Supply,
    Demand,
    Origin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ZoneTier {
    Tier1 = 1,
    Tier2 = 2,
    Tier3 = 3,
}

/// A supply, demand, or origin zone. Invariant: `final_score = score +
/// confluence_bonus` (+ optional trend bonus for new-token leniency).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub kind: ZoneKind,
    pub level_price: f64,
    pub score: f64,
    pub touches: usize,
    pub matched_fibs: Vec<f64>,
    pub confluence_bonus: f64,
    pub final_score: f64,
    pub tier: ZoneTier,
    pub is_origin: bool,
    pub origin: Option<OriginDetail>,
}

/// Extra fields carried only by the origin zone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OriginDetail {
    pub zone_bottom: f64,
    pub zone_top: f64,
    pub pump_percent: f64,
    pub consolidation_candles: usize,
}

impl Zone {
    pub fn new_swing(
        kind: ZoneKind,
        level_price: f64,
        score: f64,
        touches: usize,
        matched_fibs: Vec<f64>,
        confluence_bonus: f64,
    ) -> Self {
        let final_score = score + confluence_bonus;
        let tier = tier_for_score(final_score);
        Self {
            kind,
            level_price,
            score,
            touches,
            matched_fibs,
            confluence_bonus,
            final_score,
            tier,
            is_origin: false,
            origin: None,
        }
    }

    pub fn new_origin(
        zone_bottom: f64,
        zone_top: f64,
        pump_percent: f64,
        consolidation_candles: usize,
    ) -> Self {
        // Origin zones are forced into tier 1 with final_score = 10.
        Self {
            kind: ZoneKind::Origin,
            level_price: zone_bottom,
            score: 10.0,
            touches: 0,
            matched_fibs: Vec::new(),
            confluence_bonus: 0.0,
            final_score: 10.0,
            tier: ZoneTier::Tier1,
            is_origin: true,
            origin: Some(OriginDetail {
                zone_bottom,
                zone_top,
                pump_percent,
                consolidation_candles,
            }),
        }
    }

    /// Promotes a zone one tier (new-token leniency). Tier 1 is the ceiling.
    pub fn promote_one_tier(&mut self) {
        self.tier = match self.tier {
            ZoneTier::Tier3 => ZoneTier::Tier2,
            ZoneTier::Tier2 | ZoneTier::Tier1 => ZoneTier::Tier1,
        };
    }
}

/// `final_score >= 7 => tier 1; >= 3 => tier 2; else tier 3`.
pub fn tier_for_score(final_score: f64) -> ZoneTier {
    if final_score >= 7.0 {
        ZoneTier::Tier1
    } else if final_score >= 3.0 {
        ZoneTier::Tier2
    } else {
        ZoneTier::Tier3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_score_is_score_plus_confluence() {
        let zone = Zone::new_swing(ZoneKind::Supply, 1.0, 2.5, 3, vec![0.618], 2.5);
        assert_eq!(zone.final_score, 5.0);
        assert_eq!(zone.tier, ZoneTier::Tier2);
    }

    #[test]
    fn origin_zone_is_forced_tier1_score10() {
        let origin = Zone::new_origin(0.009, 0.012, 1.2, 25);
        assert_eq!(origin.tier, ZoneTier::Tier1);
        assert_eq!(origin.final_score, 10.0);
        assert!(origin.is_origin);
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(tier_for_score(7.0), ZoneTier::Tier1);
        assert_eq!(tier_for_score(6.999), ZoneTier::Tier2);
        assert_eq!(tier_for_score(3.0), ZoneTier::Tier2);
        assert_eq!(tier_for_score(2.999), ZoneTier::Tier3);
    }

    #[test]
    fn promotion_never_exceeds_tier1() {
        let mut zone = Zone::new_swing(ZoneKind::Demand, 1.0, 1.0, 1, vec![], 0.0);
        assert_eq!(zone.tier, ZoneTier::Tier3);
        zone.promote_one_tier();
        assert_eq!(zone.tier, ZoneTier::Tier2);
        zone.promote_one_tier();
        assert_eq!(zone.tier, ZoneTier::Tier1);
        zone.promote_one_tier();
        assert_eq!(zone.tier, ZoneTier::Tier1);
    }
}
