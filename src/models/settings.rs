use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ScannerSettings
// ---------------------------------------------------------------------------

/// User-tunable risk settings for the dashboard.
///
/// Keys missing from the persisted document fall back to these defaults on
/// load, so older settings files keep working as fields are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScannerSettings {
    /// Total account equity used for position sizing.
    pub account_equity: Decimal,
    /// Fraction of equity risked per trade (0.01 = 1%).
    pub risk_pct: f64,
    /// Soft cap on simultaneous open positions.
    pub max_positions: u32,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            account_equity: Decimal::from(100_000),
            risk_pct: 0.01,
            max_positions: 6,
        }
    }
}
