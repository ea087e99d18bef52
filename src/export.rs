//! CSV export of scan snapshots.

use std::io::Write;

use crate::error::Result;
use crate::models::ScanSnapshot;

/// Column order of the exported CSV, matching the sheet's stock table.
pub const CSV_COLUMNS: [&str; 15] = [
    "Ticker", "Name", "Score", "C", "A", "N", "S", "L", "I", "M", "RS", "Price", "Pivot", "Stop",
    "Signal",
];

/// Write a snapshot's stock table as CSV.
///
/// `filter` keeps only tickers containing the given text,
/// case-insensitively. Missing optional fields export as empty cells.
pub fn write_csv<W: Write>(snapshot: &ScanSnapshot, filter: Option<&str>, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(CSV_COLUMNS)?;

    let needle = filter.map(str::to_lowercase);
    for stock in &snapshot.stocks {
        if let Some(needle) = &needle {
            if !stock.ticker.to_lowercase().contains(needle) {
                continue;
            }
        }
        writer.write_record([
            stock.ticker.clone(),
            stock.name.clone().unwrap_or_default(),
            fmt_number(Some(stock.score)),
            stock.c.clone(),
            stock.a.clone(),
            stock.n.clone(),
            stock.s.clone(),
            stock.l.clone(),
            stock.i.clone(),
            stock.m.clone(),
            fmt_number(stock.rs),
            fmt_number(stock.price),
            fmt_number(stock.pivot),
            fmt_number(stock.stop),
            stock.signal.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn fmt_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
