pub mod alert;
pub mod journal;
pub mod settings;
pub mod snapshot;
pub mod trade;

pub use alert::*;
pub use journal::*;
pub use settings::*;
pub use snapshot::*;
pub use trade::*;

use crate::error::{CanslimError, Result};

/// Normalize and validate a user-supplied ticker: trimmed, uppercased,
/// at most 10 chars, alphanumeric plus `.` and `-`.
pub(crate) fn validate_ticker(raw: &str) -> Result<String> {
    let ticker = raw.trim().to_uppercase();
    let core: String = ticker.chars().filter(|c| *c != '.' && *c != '-').collect();
    if ticker.is_empty()
        || ticker.len() > 10
        || core.is_empty()
        || !core.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(CanslimError::InvalidArgument(
            "invalid ticker (max 10 alphanumeric chars)".into(),
        ));
    }
    Ok(ticker)
}
