//! Stock position tracker persisted as a JSON array.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config;
use crate::error::{CanslimError, Result};
use crate::models::{
    validate_ticker, Position, PositionStats, PositionsSummary, TradeStatus, TradeType,
};

use super::json_file::JsonFile;

// ---------------------------------------------------------------------------
// Input params
// ---------------------------------------------------------------------------

/// Parameters for opening a tracked position.
///
/// Optional fields fall back to the tracker's conventions (`default`
/// account, today's entry date).
#[derive(Debug, Clone)]
pub struct NewPosition {
    pub ticker: String,
    pub account: Option<String>,
    pub trade_type: TradeType,
    pub entry_date: Option<NaiveDate>,
    pub entry_price: Decimal,
    pub shares: u32,
    pub stop_price: Option<Decimal>,
    pub target_price: Option<Decimal>,
    pub setup_type: Option<String>,
    pub notes: Option<String>,
}

/// Fields a position update may touch. Setting `close_price` closes the
/// position and realizes its P&L.
#[derive(Debug, Clone, Default)]
pub struct PositionPatch {
    pub stop_price: Option<Decimal>,
    pub close_price: Option<Decimal>,
    pub close_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// PositionStore
// ---------------------------------------------------------------------------

/// Store for the stock position tracker.
pub struct PositionStore {
    file: JsonFile,
}

impl PositionStore {
    pub(crate) fn open(data_dir: &Path) -> Self {
        Self {
            file: JsonFile::new(data_dir.join(config::POSITIONS_FILE)),
        }
    }

    /// All positions in insertion order.
    pub fn list(&self) -> Result<Vec<Position>> {
        self.file.load_or(Vec::new)
    }

    /// Validate and append a new open position.
    pub fn add(&self, new: NewPosition) -> Result<Position> {
        let ticker = validate_ticker(&new.ticker)?;
        if new.shares == 0 || new.shares > 1_000_000 {
            return Err(CanslimError::InvalidArgument(
                "invalid shares (must be 1-1,000,000)".into(),
            ));
        }
        if new.entry_price <= Decimal::ZERO || new.entry_price > Decimal::from(100_000) {
            return Err(CanslimError::InvalidArgument(
                "invalid entry price (must be positive, max $100k)".into(),
            ));
        }

        self.file.update(Vec::new, move |positions: &mut Vec<Position>| {
            let id = positions.iter().map(|p| p.id).max().unwrap_or(0) + 1;
            let position = Position {
                id,
                ticker,
                account: new.account.unwrap_or_else(|| "default".to_string()),
                trade_type: new.trade_type,
                entry_date: new.entry_date.unwrap_or_else(|| Utc::now().date_naive()),
                entry_price: new.entry_price,
                shares: new.shares,
                cost_basis: (new.entry_price * Decimal::from(new.shares)).round_dp(2),
                stop_price: new.stop_price,
                target_price: new.target_price,
                setup_type: new.setup_type.unwrap_or_default(),
                status: TradeStatus::Open,
                close_date: None,
                close_price: None,
                pnl: None,
                notes: new.notes.unwrap_or_default(),
                created_at: Utc::now(),
            };
            positions.push(position.clone());
            Ok(position)
        })
    }

    /// Apply a patch to a position by id.
    pub fn update(&self, id: u64, patch: PositionPatch) -> Result<Position> {
        self.file.update(Vec::new, move |positions: &mut Vec<Position>| {
            let position = positions
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| CanslimError::NotFound(format!("position {id}")))?;

            if let Some(stop) = patch.stop_price {
                position.stop_price = Some(stop);
            }
            if let Some(close_price) = patch.close_price {
                position.status = TradeStatus::Closed;
                position.close_price = Some(close_price);
                position.close_date =
                    Some(patch.close_date.unwrap_or_else(|| Utc::now().date_naive()));
                let per_share = match position.trade_type {
                    TradeType::Long => close_price - position.entry_price,
                    TradeType::Short => position.entry_price - close_price,
                };
                position.pnl = Some((per_share * Decimal::from(position.shares)).round_dp(2));
            }
            if let Some(notes) = patch.notes {
                position.notes = notes;
            }
            Ok(position.clone())
        })
    }

    /// Delete a position by id.
    pub fn remove(&self, id: u64) -> Result<()> {
        self.file.update(Vec::new, move |positions: &mut Vec<Position>| {
            let before = positions.len();
            positions.retain(|p| p.id != id);
            if positions.len() == before {
                return Err(CanslimError::NotFound(format!("position {id}")));
            }
            Ok(())
        })
    }

    /// Overall statistics plus a per-account breakdown.
    pub fn summary(&self) -> Result<PositionsSummary> {
        let positions = self.list()?;
        let overall = summarize(&positions);

        let mut by_account: BTreeMap<String, PositionStats> = BTreeMap::new();
        let mut accounts: Vec<&str> = positions.iter().map(|p| p.account.as_str()).collect();
        accounts.sort_unstable();
        accounts.dedup();
        for account in accounts {
            let subset: Vec<Position> = positions
                .iter()
                .filter(|p| p.account == account)
                .cloned()
                .collect();
            by_account.insert(account.to_string(), summarize(&subset));
        }

        Ok(PositionsSummary { overall, by_account })
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

fn summarize(positions: &[Position]) -> PositionStats {
    let open: Vec<&Position> = positions
        .iter()
        .filter(|p| p.status == TradeStatus::Open)
        .collect();
    let closed: Vec<&Position> = positions
        .iter()
        .filter(|p| p.status == TradeStatus::Closed)
        .collect();

    let total_capital: Decimal = open.iter().map(|p| p.cost_basis).sum();
    let total_pnl: Decimal = closed.iter().filter_map(|p| p.pnl).sum();

    let win_count = closed
        .iter()
        .filter(|p| p.pnl.map(|pnl| pnl > Decimal::ZERO).unwrap_or(false))
        .count();
    let loss_count = closed.len() - win_count;
    let win_rate = if closed.is_empty() {
        0.0
    } else {
        win_count as f64 / closed.len() as f64 * 100.0
    };

    // R-multiple only makes sense for trades that had a stop.
    let mut r_multiples = Vec::new();
    for position in &closed {
        let (Some(stop), Some(close)) = (position.stop_price, position.close_price) else {
            continue;
        };
        let risk = (position.entry_price - stop).abs();
        if risk <= Decimal::ZERO {
            continue;
        }
        let per_share = match position.trade_type {
            TradeType::Long => close - position.entry_price,
            TradeType::Short => position.entry_price - close,
        };
        if let Some(r) = (per_share / risk).to_f64() {
            r_multiples.push(r);
        }
    }
    let avg_r_multiple = if r_multiples.is_empty() {
        0.0
    } else {
        r_multiples.iter().sum::<f64>() / r_multiples.len() as f64
    };

    PositionStats {
        total_capital,
        total_pnl,
        open_count: open.len(),
        closed_count: closed.len(),
        win_count,
        loss_count,
        win_rate,
        avg_r_multiple,
    }
}
