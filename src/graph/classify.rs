//! Control tier classification

use serde::{Deserialize, Serialize};

/// Strict-majority cutoff for control
pub const CONTROL_THRESHOLD_PCT: f64 = 50.0;
/// Lower bound (inclusive) of significant influence
pub const SIGNIFICANT_INFLUENCE_PCT: f64 = 20.0;

/// Accounting category of an ownership percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlTier {
    /// More than 50 %
    Control,
    /// 20 % to 50 % inclusive
    SignificantInfluence,
    /// Below 20 %
    Investment,
}

impl ControlTier {
    pub fn label(&self) -> &'static str {
        match self {
            ControlTier::Control => "Subsidiary (IFRS 10)",
            ControlTier::SignificantInfluence => "Associate (IAS 28)",
            ControlTier::Investment => "Investment",
        }
    }
}

/// Classify an aggregated ownership percentage
pub fn classify(pct: f64) -> ControlTier {
    if pct > CONTROL_THRESHOLD_PCT {
        ControlTier::Control
    } else if pct >= SIGNIFICANT_INFLUENCE_PCT {
        ControlTier::SignificantInfluence
    } else {
        ControlTier::Investment
    }
}
