//! Price alerts persisted as a JSON array.

use std::path::Path;

use rust_decimal::Decimal;

use crate::config;
use crate::error::{CanslimError, Result};
use crate::models::{AlertCondition, PriceAlert};

use super::json_file::JsonFile;

/// Store for user price alerts.
pub struct AlertStore {
    file: JsonFile,
}

impl AlertStore {
    pub(crate) fn open(data_dir: &Path) -> Self {
        Self {
            file: JsonFile::new(data_dir.join(config::ALERTS_FILE)),
        }
    }

    /// All alerts in insertion order.
    pub fn list(&self) -> Result<Vec<PriceAlert>> {
        self.file.load_or(Vec::new)
    }

    /// Validate and append a new alert.
    pub fn add(&self, ticker: &str, condition: AlertCondition, price: Decimal) -> Result<PriceAlert> {
        let alert = PriceAlert::new(ticker, condition, price)?;
        let stored = alert.clone();
        self.file.update(Vec::new, move |alerts: &mut Vec<PriceAlert>| {
            alerts.push(alert);
            Ok(())
        })?;
        Ok(stored)
    }

    /// Remove and return the alert at `index`.
    pub fn remove(&self, index: usize) -> Result<PriceAlert> {
        self.file.update(Vec::new, |alerts: &mut Vec<PriceAlert>| {
            if index >= alerts.len() {
                return Err(CanslimError::NotFound(format!("no alert at index {index}")));
            }
            Ok(alerts.remove(index))
        })
    }
}
