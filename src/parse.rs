//! Fixed-layout ingestion: raw 2D cell arrays into [`ScanSnapshot`]s.
//!
//! The sheet layout is positional, not self-describing: a title row
//! carrying the scan timestamp, a label/value row pair for market health,
//! a label/value row pair for account settings, a blank separator, a
//! header row naming the stock columns, then data rows until the first
//! fully empty row. Only the header row is interpreted by name; everything
//! above it is fixed-position.

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::error::{CanslimError, Result};
use crate::models::{MarketRegime, ScanSnapshot, StockRecord};

// Fixed row positions. Rows 1 and 3 are label rows and are not read.
const ROW_TITLE: usize = 0;
const ROW_MARKET_VALUES: usize = 2;
const ROW_ACCOUNT_VALUES: usize = 4;
const ROW_HEADER: usize = 6;
const ROW_DATA_START: usize = 7;

const COL_TIMESTAMP: usize = 2;

// ---------------------------------------------------------------------------
// parse_cells
// ---------------------------------------------------------------------------

/// Parse a raw cell array into a fully formed snapshot.
///
/// Fails with [`CanslimError::MalformedLayout`] when a required
/// fixed-position cell is absent or unparsable, and with
/// [`CanslimError::InvalidRow`] (tagged with the absolute row index) when
/// one stock row cannot be coerced. An empty data row is the end-of-data
/// sentinel, not an error.
pub fn parse_cells(raw: &[Vec<String>]) -> Result<ScanSnapshot> {
    if raw.len() <= ROW_HEADER {
        return Err(CanslimError::MalformedLayout(format!(
            "expected at least {} rows, got {}",
            ROW_HEADER + 1,
            raw.len()
        )));
    }

    let timestamp = required(raw, ROW_TITLE, COL_TIMESTAMP, "scan timestamp")?.to_string();

    let market_regime = MarketRegime::parse(required(raw, ROW_MARKET_VALUES, 0, "market regime")?);
    let distribution_days =
        parse_count(required(raw, ROW_MARKET_VALUES, 2, "distribution days")?, "distribution days")?;
    let buy_signal = parse_flag(required(raw, ROW_MARKET_VALUES, 4, "buy signal")?)?;

    let account_balance =
        parse_money(required(raw, ROW_ACCOUNT_VALUES, 0, "account balance")?, "account balance")?;
    let risk_per_trade =
        parse_money(required(raw, ROW_ACCOUNT_VALUES, 2, "risk per trade")?, "risk per trade")?;
    let actionable_count = match cell(raw, ROW_ACCOUNT_VALUES, 4) {
        Some(text) => Some(parse_count(text, "actionable count")?),
        None => None,
    };

    let columns = Columns::from_header(&raw[ROW_HEADER])?;

    let mut stocks = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for (index, row) in raw.iter().enumerate().skip(ROW_DATA_START) {
        if is_blank(row) {
            break;
        }
        let stock = columns.parse_row(index, row)?;
        if !seen.insert(stock.ticker.clone()) {
            // Ambiguous source data is surfaced, not silently deduplicated.
            return Err(CanslimError::InvalidRow {
                index,
                reason: format!("duplicate ticker {}", stock.ticker),
                raw: row.clone(),
            });
        }
        stocks.push(stock);
    }

    Ok(ScanSnapshot {
        timestamp,
        market_regime,
        distribution_days,
        buy_signal,
        account_balance,
        risk_per_trade,
        actionable_count,
        stocks,
    })
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// Stock-column positions resolved from the header row by name.
///
/// Header matching is case-insensitive; unknown trailing columns are
/// ignored. `Ticker` and `Score` are mandatory.
struct Columns {
    ticker: usize,
    name: Option<usize>,
    score: usize,
    c: Option<usize>,
    a: Option<usize>,
    n: Option<usize>,
    s: Option<usize>,
    l: Option<usize>,
    i: Option<usize>,
    m: Option<usize>,
    rs: Option<usize>,
    price: Option<usize>,
    pivot: Option<usize>,
    stop: Option<usize>,
    signal: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> Result<Self> {
        let find = |label: &str| {
            header
                .iter()
                .position(|cell| cell.trim().eq_ignore_ascii_case(label))
        };

        let ticker = find("Ticker").ok_or_else(|| {
            CanslimError::MalformedLayout("header row is missing required column Ticker".into())
        })?;
        let score = find("Score").ok_or_else(|| {
            CanslimError::MalformedLayout("header row is missing required column Score".into())
        })?;

        Ok(Self {
            ticker,
            score,
            name: find("Name"),
            c: find("C"),
            a: find("A"),
            n: find("N"),
            s: find("S"),
            l: find("L"),
            i: find("I"),
            m: find("M"),
            rs: find("RS"),
            price: find("Price"),
            pivot: find("Pivot"),
            stop: find("Stop"),
            signal: find("Signal"),
        })
    }

    fn parse_row(&self, index: usize, row: &[String]) -> Result<StockRecord> {
        let invalid = |reason: String| CanslimError::InvalidRow {
            index,
            reason,
            raw: row.to_vec(),
        };

        let ticker = text_at(row, Some(self.ticker))
            .ok_or_else(|| invalid("ticker is empty".into()))?
            .to_string();

        let score_text =
            text_at(row, Some(self.score)).ok_or_else(|| invalid("score is missing".into()))?;
        let score = parse_number(score_text)
            .ok_or_else(|| invalid(format!("score {score_text:?} is not numeric")))?;

        let numeric = |col: Option<usize>, label: &str| -> Result<Option<f64>> {
            match text_at(row, col) {
                Some(text) => parse_number(text)
                    .map(Some)
                    .ok_or_else(|| invalid(format!("{label} {text:?} is not numeric"))),
                None => Ok(None),
            }
        };

        Ok(StockRecord {
            ticker,
            name: text_at(row, self.name).map(str::to_string),
            score,
            c: grade_at(row, self.c),
            a: grade_at(row, self.a),
            n: grade_at(row, self.n),
            s: grade_at(row, self.s),
            l: grade_at(row, self.l),
            i: grade_at(row, self.i),
            m: grade_at(row, self.m),
            rs: numeric(self.rs, "rs")?,
            price: numeric(self.price, "price")?,
            pivot: numeric(self.pivot, "pivot")?,
            stop: numeric(self.stop, "stop")?,
            signal: grade_at(row, self.signal),
        })
    }
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Trimmed, non-empty cell text at a fixed position.
fn cell(raw: &[Vec<String>], row: usize, col: usize) -> Option<&str> {
    let text = raw.get(row)?.get(col)?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn required<'a>(raw: &'a [Vec<String>], row: usize, col: usize, what: &str) -> Result<&'a str> {
    cell(raw, row, col).ok_or_else(|| {
        CanslimError::MalformedLayout(format!("row {row} is missing the {what} cell"))
    })
}

/// Trimmed cell text within a stock row; trailing cells may be absent.
fn text_at(row: &[String], col: Option<usize>) -> Option<&str> {
    let text = row.get(col?)?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Grade/signal cells: empty stays empty rather than `None`.
fn grade_at(row: &[String], col: Option<usize>) -> String {
    text_at(row, col).unwrap_or_default().to_string()
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Numeric coercion shared by scores and optional price fields; tolerates
/// currency symbols and thousands separators.
fn parse_number(text: &str) -> Option<f64> {
    strip_currency(text).parse().ok()
}

fn parse_count(text: &str, what: &str) -> Result<u32> {
    text.parse().map_err(|_| {
        CanslimError::MalformedLayout(format!("{what} {text:?} is not a non-negative integer"))
    })
}

fn parse_flag(text: &str) -> Result<bool> {
    if text.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(CanslimError::MalformedLayout(format!(
            "buy signal {text:?} is not TRUE/FALSE"
        )))
    }
}

fn parse_money(text: &str, what: &str) -> Result<Decimal> {
    strip_currency(text).parse().map_err(|_| {
        CanslimError::MalformedLayout(format!("{what} {text:?} is not a monetary amount"))
    })
}

fn strip_currency(text: &str) -> String {
    text.chars().filter(|c| *c != '$' && *c != ',').collect()
}
