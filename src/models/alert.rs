use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CanslimError, Result};

use super::validate_ticker;

// ---------------------------------------------------------------------------
// AlertCondition
// ---------------------------------------------------------------------------

/// Direction a price alert triggers in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    Above,
    Below,
}

// ---------------------------------------------------------------------------
// PriceAlert
// ---------------------------------------------------------------------------

/// A user-defined price alert on one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAlert {
    pub ticker: String,
    pub condition: AlertCondition,
    pub price: Decimal,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub triggered: bool,
}

impl PriceAlert {
    /// Build a validated alert; the ticker is normalized to uppercase.
    pub fn new(ticker: &str, condition: AlertCondition, price: Decimal) -> Result<Self> {
        let ticker = validate_ticker(ticker)?;
        if price <= Decimal::ZERO || price > Decimal::from(1_000_000) {
            return Err(CanslimError::InvalidArgument(
                "alert price must be positive, max $1M".into(),
            ));
        }
        Ok(Self {
            ticker,
            condition,
            price,
            created: Utc::now(),
            triggered: false,
        })
    }
}
