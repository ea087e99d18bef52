use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// MarketRegime
// ---------------------------------------------------------------------------

/// Categorical market-health label driving risk posture.
///
/// The scanner emits one of four known labels; anything else is preserved
/// verbatim as [`MarketRegime::Other`] rather than rejected, since the
/// upstream sheet owns the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarketRegime {
    Confirmed,
    RallyAttempt,
    UnderPressure,
    Correction,
    Other(String),
}

impl MarketRegime {
    /// Map a raw sheet label onto a regime, falling back to free text.
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "Confirmed" => Self::Confirmed,
            "Rally Attempt" => Self::RallyAttempt,
            "Under Pressure" => Self::UnderPressure,
            "Correction" => Self::Correction,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Confirmed => "Confirmed",
            Self::RallyAttempt => "Rally Attempt",
            Self::UnderPressure => "Under Pressure",
            Self::Correction => "Correction",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for MarketRegime {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl From<MarketRegime> for String {
    fn from(regime: MarketRegime) -> Self {
        regime.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// StockRecord
// ---------------------------------------------------------------------------

/// One row of scan output.
///
/// Owned exclusively by its parent [`ScanSnapshot`]; the same ticker in two
/// snapshots is two independent records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    /// Short identifier, unique within a snapshot.
    pub ticker: String,
    pub name: Option<String>,
    /// Composite score, 0-100 expected but not enforced.
    pub score: f64,
    // Factor grades: single-letter strings, empty when the sheet left the
    // cell blank.
    #[serde(default)]
    pub c: String,
    #[serde(default)]
    pub a: String,
    #[serde(default)]
    pub n: String,
    #[serde(default)]
    pub s: String,
    #[serde(default)]
    pub l: String,
    #[serde(default)]
    pub i: String,
    #[serde(default)]
    pub m: String,
    /// Relative strength; missing cell is `None`, never zero.
    pub rs: Option<f64>,
    pub price: Option<f64>,
    pub pivot: Option<f64>,
    pub stop: Option<f64>,
    /// Free-text signal, e.g. "Buy" or "Watch".
    #[serde(default)]
    pub signal: String,
}

// ---------------------------------------------------------------------------
// ScanSnapshot
// ---------------------------------------------------------------------------

/// Immutable record of one successful fetch.
///
/// Fully formed or not constructed at all: a partial parse failure is an
/// error, never a partially populated snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSnapshot {
    /// When the source scan was produced (not when it was fetched).
    pub timestamp: String,
    pub market_regime: MarketRegime,
    pub distribution_days: u32,
    pub buy_signal: bool,
    pub account_balance: Decimal,
    pub risk_per_trade: Decimal,
    /// Count of actionable setups the scanner reported, when present.
    pub actionable_count: Option<u32>,
    /// Stock rows in the exact order received from the source.
    pub stocks: Vec<StockRecord>,
}
