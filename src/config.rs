//! Configuration surface: sheet coordinates, cache policy, and the
//! on-disk data layout.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CanslimError, Result};

/// Default cell range covering the scanner's `Main` tab.
pub const DEFAULT_RANGE: &str = "'Main'!A1:W50";

/// Default time-to-live for a cached snapshot.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default bound on one external fetch invocation.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

// Data-file layout under the SDK's data directory.
pub const ALERTS_FILE: &str = "alerts.json";
pub const EARNINGS_FILE: &str = "earnings.json";
pub const SETTINGS_FILE: &str = "settings.json";
pub const POSITIONS_FILE: &str = "positions.json";
pub const COVERED_CALLS_FILE: &str = "covered_calls.json";
pub const HISTORY_DIR: &str = "history";
pub const ROUTINES_DIR: &str = "routines";

/// Coordinates of the scanner sheet and how to reach it through the
/// external CLI.
///
/// The account reference is passed to the child process environment; the
/// CLI authenticates out-of-band.
#[derive(Debug, Clone)]
pub struct SheetConfig {
    /// Spreadsheet identifier.
    pub sheet_id: String,
    /// Cell range expression, e.g. `'Main'!A1:W50`.
    pub range: String,
    /// Account/credential reference for the CLI.
    pub account: String,
    /// Bound on one fetch invocation; the child is killed past this.
    pub fetch_timeout: Duration,
}

impl SheetConfig {
    /// Create a config with the default range and fetch timeout.
    pub fn new(sheet_id: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            range: DEFAULT_RANGE.to_string(),
            account: account.into(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Check that every field required for a fetch is present.
    ///
    /// Absence is a configuration error, surfaced before the first fetch,
    /// never an ingestion error.
    pub fn validate(&self) -> Result<()> {
        if self.sheet_id.trim().is_empty() {
            return Err(CanslimError::Config("sheet id must be set".into()));
        }
        if self.range.trim().is_empty() {
            return Err(CanslimError::Config("cell range must be set".into()));
        }
        if self.account.trim().is_empty() {
            return Err(CanslimError::Config("account reference must be set".into()));
        }
        Ok(())
    }
}

/// Platform-appropriate default data directory
/// (e.g. `~/.local/share/canslim-sdk` on Linux).
pub fn default_data_dir() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("canslim-sdk")
    } else {
        PathBuf::from(".canslim-sdk-data")
    }
}
