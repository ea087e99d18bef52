//! Covered-call tracker persisted as a JSON array.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config;
use crate::error::{CanslimError, Result};
use crate::models::{validate_ticker, CallStats, CallStatus, CallsSummary, CoveredCall};

use super::json_file::JsonFile;

/// Contract multiplier: one option contract covers 100 shares.
const CONTRACT_SIZE: u32 = 100;

// ---------------------------------------------------------------------------
// Input params
// ---------------------------------------------------------------------------

/// Parameters for recording a sold covered call.
#[derive(Debug, Clone)]
pub struct NewCoveredCall {
    pub ticker: String,
    pub sell_date: Option<NaiveDate>,
    pub expiry: Option<NaiveDate>,
    pub strike: Decimal,
    pub contracts: u32,
    pub premium_per_contract: Decimal,
    pub delta: Option<f64>,
    pub stock_price_at_sell: Option<Decimal>,
    pub notes: Option<String>,
}

/// How a covered call left the book.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CallOutcome {
    /// Expired worthless; the full premium is kept.
    Expired,
    /// Shares were called away at the strike.
    CalledAway,
    /// Bought back early at a price per contract.
    BoughtBack { buyback_price: Decimal },
}

// ---------------------------------------------------------------------------
// CoveredCallStore
// ---------------------------------------------------------------------------

/// Store for the covered-call tracker.
pub struct CoveredCallStore {
    file: JsonFile,
}

impl CoveredCallStore {
    pub(crate) fn open(data_dir: &Path) -> Self {
        Self {
            file: JsonFile::new(data_dir.join(config::COVERED_CALLS_FILE)),
        }
    }

    /// All tracked calls in insertion order.
    pub fn list(&self) -> Result<Vec<CoveredCall>> {
        self.file.load_or(Vec::new)
    }

    /// Validate and append a new open covered call.
    pub fn add(&self, new: NewCoveredCall) -> Result<CoveredCall> {
        let ticker = validate_ticker(&new.ticker)?;
        if new.contracts == 0 || new.contracts > 10_000 {
            return Err(CanslimError::InvalidArgument(
                "invalid contracts (must be 1-10,000)".into(),
            ));
        }
        if new.premium_per_contract < Decimal::ZERO
            || new.premium_per_contract > Decimal::from(10_000)
        {
            return Err(CanslimError::InvalidArgument(
                "invalid premium (must be 0-$10,000)".into(),
            ));
        }
        if new.strike <= Decimal::ZERO || new.strike > Decimal::from(100_000) {
            return Err(CanslimError::InvalidArgument(
                "invalid strike (must be positive, max $100k)".into(),
            ));
        }

        let premium_total = (new.premium_per_contract
            * Decimal::from(new.contracts)
            * Decimal::from(CONTRACT_SIZE))
        .round_dp(2);

        self.file.update(Vec::new, move |calls: &mut Vec<CoveredCall>| {
            let id = calls.iter().map(|c| c.id).max().unwrap_or(0) + 1;
            let call = CoveredCall {
                id,
                ticker,
                sell_date: new.sell_date.unwrap_or_else(|| Utc::now().date_naive()),
                expiry: new.expiry,
                strike: new.strike,
                contracts: new.contracts,
                premium_per_contract: new.premium_per_contract,
                premium_total,
                delta: new.delta,
                stock_price_at_sell: new.stock_price_at_sell,
                status: CallStatus::Open,
                close_date: None,
                close_price: None,
                pnl: None,
                notes: new.notes.unwrap_or_default(),
                created_at: Utc::now(),
            };
            calls.push(call.clone());
            Ok(call)
        })
    }

    /// Close a call by id, realizing its P&L per the outcome.
    pub fn close(
        &self,
        id: u64,
        outcome: CallOutcome,
        close_date: Option<NaiveDate>,
        notes: Option<String>,
    ) -> Result<CoveredCall> {
        self.file.update(Vec::new, move |calls: &mut Vec<CoveredCall>| {
            let call = calls
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| CanslimError::NotFound(format!("covered call {id}")))?;

            let shares = Decimal::from(call.contracts) * Decimal::from(CONTRACT_SIZE);
            match outcome {
                CallOutcome::Expired => {
                    call.status = CallStatus::Expired;
                    call.pnl = Some(call.premium_total);
                }
                CallOutcome::CalledAway => {
                    call.status = CallStatus::CalledAway;
                    let basis = call.stock_price_at_sell.unwrap_or(Decimal::ZERO);
                    let appreciation = (call.strike - basis) * shares;
                    call.pnl = Some((call.premium_total + appreciation).round_dp(2));
                }
                CallOutcome::BoughtBack { buyback_price } => {
                    call.status = CallStatus::BoughtBack;
                    call.close_price = Some(buyback_price);
                    let buyback = buyback_price * shares;
                    call.pnl = Some((call.premium_total - buyback).round_dp(2));
                }
            }
            call.close_date = Some(close_date.unwrap_or_else(|| Utc::now().date_naive()));
            if let Some(notes) = notes {
                call.notes = notes;
            }
            Ok(call.clone())
        })
    }

    /// Delete a call by id.
    pub fn remove(&self, id: u64) -> Result<()> {
        self.file.update(Vec::new, move |calls: &mut Vec<CoveredCall>| {
            let before = calls.len();
            calls.retain(|c| c.id != id);
            if calls.len() == before {
                return Err(CanslimError::NotFound(format!("covered call {id}")));
            }
            Ok(())
        })
    }

    /// Overall statistics plus a per-ticker breakdown, with yield
    /// annualized against `capital`.
    pub fn summary(&self, capital: Decimal) -> Result<CallsSummary> {
        let calls = self.list()?;
        let overall = summarize(&calls, capital);

        let mut by_ticker: BTreeMap<String, CallStats> = BTreeMap::new();
        let mut tickers: Vec<&str> = calls.iter().map(|c| c.ticker.as_str()).collect();
        tickers.sort_unstable();
        tickers.dedup();
        for ticker in tickers {
            let subset: Vec<CoveredCall> = calls
                .iter()
                .filter(|c| c.ticker == ticker)
                .cloned()
                .collect();
            by_ticker.insert(ticker.to_string(), summarize(&subset, capital));
        }

        Ok(CallsSummary { overall, by_ticker })
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

fn summarize(calls: &[CoveredCall], capital: Decimal) -> CallStats {
    if calls.is_empty() {
        return CallStats::default();
    }

    let total_premium: Decimal = calls.iter().map(|c| c.premium_total).sum();
    let closed: Vec<&CoveredCall> = calls
        .iter()
        .filter(|c| c.status != CallStatus::Open)
        .collect();
    // Closed calls without a realized P&L count their premium.
    let total_pnl: Decimal = closed
        .iter()
        .map(|c| c.pnl.unwrap_or(c.premium_total))
        .sum();

    let expired = calls.iter().filter(|c| c.status == CallStatus::Expired).count();
    let called_away = calls
        .iter()
        .filter(|c| c.status == CallStatus::CalledAway)
        .count();
    let open = calls.iter().filter(|c| c.status == CallStatus::Open).count();

    let avg_premium = (total_premium / Decimal::from(calls.len() as u64)).round_dp(2);

    // Annualize the monthly premium run-rate against account capital.
    let months: BTreeSet<(i32, u32)> = calls
        .iter()
        .map(|c| (c.sell_date.year(), c.sell_date.month()))
        .collect();
    let months = months.len().max(1) as u64;
    let annualized_yield = if capital > Decimal::ZERO {
        (total_premium / Decimal::from(months) * Decimal::from(12u64) / capital
            * Decimal::from(100u64))
        .to_f64()
        .unwrap_or(0.0)
    } else {
        0.0
    };

    CallStats {
        total_premium,
        total_pnl,
        total_trades: calls.len(),
        expired,
        called_away,
        open,
        avg_premium,
        annualized_yield,
    }
}
