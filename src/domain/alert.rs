use serde::{Deserialize, Serialize};

/// Signal family discriminant. Optional payload fields on `Signal` are
/// present exactly when the corresponding kind implies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    ResistanceBreakout,
    SupportBreakdown,
    ApproachingResistance,
    ApproachingSupport,
    OriginRetest,
    TrendlineBreak,
    FibConfluence,
    GemEarlyMomentum,
    GemVolumeSpike,
    PullbackRetest,
}

impl SignalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalKind::ResistanceBreakout => "resistance_breakout",
            SignalKind::SupportBreakdown => "support_breakdown",
            SignalKind::ApproachingResistance => "approaching_resistance",
            SignalKind::ApproachingSupport => "approaching_support",
            SignalKind::OriginRetest => "origin_retest",
            SignalKind::TrendlineBreak => "trendline_break",
            SignalKind::FibConfluence => "fib_confluence",
            SignalKind::GemEarlyMomentum => "gem_early_momentum",
            SignalKind::GemVolumeSpike => "gem_volume_spike",
            SignalKind::PullbackRetest => "pullback_retest",
        }
    }

    /// Gem-family signals are cooled down by `(token_address, signal_type)`
    /// rather than by price proximity.
    pub fn is_gem_family(self) -> bool {
        matches!(self, SignalKind::GemEarlyMomentum | SignalKind::GemVolumeSpike)
    }

    /// Kinds whose `signal_type` carries "support": cooled down under the
    /// support family (8% / 1.0h) rather than the default (9% / 2.0h).
    pub fn is_support_family(self) -> bool {
        matches!(self, SignalKind::SupportBreakdown | SignalKind::ApproachingSupport)
    }
}

/// A candidate signal produced by StrategyEngine for one token. Carries
/// enough context for ChatSink formatting and for CooldownGate keying.
#[derive(Debug, Clone)]
pub struct Signal {
    pub kind: SignalKind,
    pub token_address: String,
    pub symbol: String,
    pub price: f64,
    pub confidence_score: f64,
    pub timestamp: i64,
    /// Present for zone-anchored kinds (the breakout/approach pairs,
    /// origin retest, pullback retest); absent for trendline/gem signals.
    pub zone_price: Option<f64>,
    /// Present only for OriginRetest.
    pub origin_multiple: Option<f64>,
    /// Present only for FibConfluence.
    pub fib_ratio: Option<f64>,
    /// Optional enrichment from HolderClient; never gates emission.
    pub whale_count: Option<u32>,
}

impl Signal {
    /// The key CooldownGate uses to deduplicate this signal against
    /// recent alert history: price-proximity keyed for zone signals,
    /// type-keyed for gem signals.
    pub fn cooldown_key(&self) -> String {
        if self.kind.is_gem_family() {
            format!("{}:{}", self.token_address, self.kind.as_str())
        } else {
            let anchor = self.zone_price.unwrap_or(self.price);
            format!("{}:{:.6}", self.token_address, anchor)
        }
    }
}

/// An append-only record of a signal that was actually delivered.
#[derive(Debug, Clone)]
pub struct AlertRecord {
    pub id: i64,
    pub token_address: String,
    pub signal_type: String,
    pub zone_price: Option<f64>,
    pub price_at_alert: f64,
    pub confidence_score: f64,
    pub sent_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: SignalKind, zone_price: Option<f64>) -> Signal {
        Signal {
            kind,
            token_address: "TokAddr".into(),
            symbol: "TOK".into(),
            price: 1.23,
            confidence_score: 8.0,
            timestamp: 1_700_000_000,
            zone_price,
            origin_multiple: None,
            fib_ratio: None,
            whale_count: None,
        }
    }

    #[test]
    fn gem_signals_key_by_type_not_price() {
        let a = sample(SignalKind::GemVolumeSpike, None);
        let b = Signal { price: 9.99, ..sample(SignalKind::GemVolumeSpike, None) };
        assert_eq!(a.cooldown_key(), b.cooldown_key());
    }

    #[test]
    fn zone_signals_key_by_anchor_price() {
        let a = sample(SignalKind::ResistanceBreakout, Some(1.5));
        let b = sample(SignalKind::ResistanceBreakout, Some(1.50000001));
        assert_ne!(a.cooldown_key(), b.cooldown_key());
        let c = sample(SignalKind::ResistanceBreakout, Some(1.500000));
        assert_eq!(a.cooldown_key(), c.cooldown_key());
    }
}
