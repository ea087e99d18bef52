//! Position sizing derived from a snapshot and the user's risk settings.
//!
//! Pure math over already-fetched data; the snapshot itself is never
//! mutated with derived fields.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::models::{ScanSnapshot, ScannerSettings, StockRecord};

// ---------------------------------------------------------------------------
// PositionSize
// ---------------------------------------------------------------------------

/// A sized entry for one stock: how many shares the risk budget buys.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSize {
    pub shares: u32,
    /// `shares * pivot`, rounded to cents.
    pub cost: Decimal,
    /// Distance between pivot and stop.
    pub risk_per_share: Decimal,
}

/// One stock paired with its computed size, when sizable.
#[derive(Debug, Clone, PartialEq)]
pub struct SizedStock {
    pub stock: StockRecord,
    /// `None` when pivot/stop are missing or do not define a valid risk.
    pub size: Option<PositionSize>,
}

// ---------------------------------------------------------------------------
// Sizing math
// ---------------------------------------------------------------------------

/// Size a single entry from its pivot and stop.
///
/// Requires `pivot > stop > 0`; anything else is unsizable and returns
/// `None` rather than a zero-risk division.
pub fn size_position(
    settings: &ScannerSettings,
    pivot: Option<f64>,
    stop: Option<f64>,
) -> Option<PositionSize> {
    let pivot = Decimal::from_f64(pivot?)?;
    let stop = Decimal::from_f64(stop?)?;
    if stop <= Decimal::ZERO || pivot <= stop {
        return None;
    }

    let risk_per_share = pivot - stop;
    let risk_budget = settings.account_equity * Decimal::from_f64(settings.risk_pct)?;
    let shares = (risk_budget / risk_per_share).floor();
    let shares = shares.to_u32()?;

    Some(PositionSize {
        shares,
        cost: (Decimal::from(shares) * pivot).round_dp(2),
        risk_per_share,
    })
}

/// Size every stock in a snapshot against the current settings.
///
/// Order follows the snapshot's stock order.
pub fn plan(snapshot: &ScanSnapshot, settings: &ScannerSettings) -> Vec<SizedStock> {
    snapshot
        .stocks
        .iter()
        .map(|stock| SizedStock {
            stock: stock.clone(),
            size: size_position(settings, stock.pivot, stock.stop),
        })
        .collect()
}
