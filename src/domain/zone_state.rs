use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneStateKind {
    Idle,
    ApproachingUp,
    ApproachingDown,
    Testing,
    BrokenUp,
    BrokenDown,
    Cooldown,
}

impl ZoneStateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ZoneStateKind::Idle => "IDLE",
            ZoneStateKind::ApproachingUp => "APPROACHING_UP",
            ZoneStateKind::ApproachingDown => "APPROACHING_DOWN",
            ZoneStateKind::Testing => "TESTING",
            ZoneStateKind::BrokenUp => "BROKEN_UP",
            ZoneStateKind::BrokenDown => "BROKEN_DOWN",
            ZoneStateKind::Cooldown => "COOLDOWN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "IDLE" => ZoneStateKind::Idle,
            "APPROACHING_UP" => ZoneStateKind::ApproachingUp,
            "APPROACHING_DOWN" => ZoneStateKind::ApproachingDown,
            "TESTING" => ZoneStateKind::Testing,
            "BROKEN_UP" => ZoneStateKind::BrokenUp,
            "BROKEN_DOWN" => ZoneStateKind::BrokenDown,
            "COOLDOWN" => ZoneStateKind::Cooldown,
            _ => return None,
        })
    }
}

/// Per-`(token_address, zone_price)` state-machine record. Uniqueness:
/// `(token_address, zone_price)` collapsed within 0.1% tolerance.
#[derive(Debug, Clone)]
pub struct ZoneState {
    pub token_address: String,
    pub zone_price: f64,
    pub current_state: ZoneStateKind,
    pub last_signal_type: Option<String>,
    pub last_signal_time: Option<i64>,
    pub last_price: f64,
}

impl ZoneState {
    pub fn idle(token_address: &str, zone_price: f64) -> Self {
        Self {
            token_address: token_address.to_string(),
            zone_price,
            current_state: ZoneStateKind::Idle,
            last_signal_type: None,
            last_signal_time: None,
            last_price: 0.0,
        }
    }

    /// True if `other_price` collapses into this state's zone_price key
    /// under the 0.1% numeric-key-collapse tolerance.
    pub fn matches_price(&self, other_price: f64) -> bool {
        if self.zone_price <= 0.0 {
            return false;
        }
        ((other_price - self.zone_price) / self.zone_price).abs() < 0.001
    }
}
