use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Stock positions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

/// One tracked stock position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: u64,
    pub ticker: String,
    /// Account label the position belongs to ("default" when unset).
    pub account: String,
    pub trade_type: TradeType,
    pub entry_date: NaiveDate,
    pub entry_price: Decimal,
    pub shares: u32,
    /// `shares * entry_price`, rounded to cents at entry.
    pub cost_basis: Decimal,
    pub stop_price: Option<Decimal>,
    pub target_price: Option<Decimal>,
    #[serde(default)]
    pub setup_type: String,
    pub status: TradeStatus,
    pub close_date: Option<NaiveDate>,
    pub close_price: Option<Decimal>,
    /// Realized P&L, set when the position is closed.
    pub pnl: Option<Decimal>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregate statistics over a set of positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PositionStats {
    /// Cost basis tied up in open positions.
    pub total_capital: Decimal,
    /// Realized P&L across closed positions.
    pub total_pnl: Decimal,
    pub open_count: usize,
    pub closed_count: usize,
    pub win_count: usize,
    pub loss_count: usize,
    /// Percent of closed trades with positive P&L.
    pub win_rate: f64,
    /// Mean realized R-multiple over closed trades with a known stop.
    pub avg_r_multiple: f64,
}

/// Overall stats plus a per-account breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PositionsSummary {
    pub overall: PositionStats,
    pub by_account: BTreeMap<String, PositionStats>,
}

// ---------------------------------------------------------------------------
// Covered calls
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Open,
    Expired,
    CalledAway,
    BoughtBack,
}

/// One covered-call trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoveredCall {
    pub id: u64,
    pub ticker: String,
    pub sell_date: NaiveDate,
    pub expiry: Option<NaiveDate>,
    pub strike: Decimal,
    pub contracts: u32,
    pub premium_per_contract: Decimal,
    /// `premium_per_contract * contracts * 100`, fixed at entry.
    pub premium_total: Decimal,
    pub delta: Option<f64>,
    pub stock_price_at_sell: Option<Decimal>,
    pub status: CallStatus,
    pub close_date: Option<NaiveDate>,
    /// Buyback price per contract when bought back early.
    pub close_price: Option<Decimal>,
    pub pnl: Option<Decimal>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregate statistics over a set of covered calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CallStats {
    pub total_premium: Decimal,
    pub total_pnl: Decimal,
    pub total_trades: usize,
    pub expired: usize,
    pub called_away: usize,
    pub open: usize,
    /// Mean premium collected per trade.
    pub avg_premium: Decimal,
    /// Premium run-rate annualized against account capital, in percent.
    pub annualized_yield: f64,
}

/// Overall stats plus a per-ticker breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CallsSummary {
    pub overall: CallStats,
    pub by_ticker: BTreeMap<String, CallStats>,
}
