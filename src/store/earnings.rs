//! Earnings calendar: ticker to next earnings date.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;

use crate::config;
use crate::error::Result;
use crate::models::validate_ticker;

use super::json_file::JsonFile;

/// Store for per-ticker earnings dates.
pub struct EarningsStore {
    file: JsonFile,
}

impl EarningsStore {
    pub(crate) fn open(data_dir: &Path) -> Self {
        Self {
            file: JsonFile::new(data_dir.join(config::EARNINGS_FILE)),
        }
    }

    pub fn all(&self) -> Result<BTreeMap<String, NaiveDate>> {
        self.file.load_or(BTreeMap::new)
    }

    pub fn get(&self, ticker: &str) -> Result<Option<NaiveDate>> {
        let ticker = validate_ticker(ticker)?;
        Ok(self.all()?.get(&ticker).copied())
    }

    /// Set (or overwrite) the earnings date for a ticker.
    pub fn set(&self, ticker: &str, date: NaiveDate) -> Result<()> {
        let ticker = validate_ticker(ticker)?;
        self.file
            .update(BTreeMap::new, move |map: &mut BTreeMap<String, NaiveDate>| {
                map.insert(ticker, date);
                Ok(())
            })
    }

    /// Remove a ticker's earnings date; returns whether it existed.
    pub fn remove(&self, ticker: &str) -> Result<bool> {
        let ticker = validate_ticker(ticker)?;
        self.file
            .update(BTreeMap::new, move |map: &mut BTreeMap<String, NaiveDate>| {
                Ok(map.remove(&ticker).is_some())
            })
    }
}
