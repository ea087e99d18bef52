//! CANSLIM scanner SDK for Rust.
//!
//! Reads stock-scan data from a spreadsheet reachable only through the
//! `gog` CLI, parses the fixed sheet layout into typed snapshots, caches
//! them with a TTL, persists a history of distinct scans, and keeps the
//! dashboard's JSON-file stores (settings, price alerts, earnings dates,
//! positions, covered calls, daily routines) on disk.
//!
//! # Quick start
//!
//! ```no_run
//! use canslim_sdk::CanslimSdk;
//!
//! let sdk = CanslimSdk::builder()
//!     .sheet("1AbCdEfGhIjK", "scanner@example.com")
//!     .build()
//!     .unwrap();
//!
//! // Cached within the TTL; fetches through the CLI on a miss.
//! let snapshot = sdk.snapshot().unwrap();
//! println!("{} ({} stocks)", snapshot.market_regime, snapshot.stocks.len());
//!
//! // Size the actionable entries against the saved risk settings.
//! for sized in sdk.position_plan().unwrap() {
//!     if let Some(size) = sized.size {
//!         println!("{}: {} shares", sized.stock.ticker, size.shares);
//!     }
//! }
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod models;
pub mod parse;
pub mod sizing;
pub mod source;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncCanslimSdk;
pub use cache::SnapshotCache;
pub use config::SheetConfig;
pub use error::{CanslimError, Result};
pub use history::{HistoryEntry, HistoryStore};
pub use models::{MarketRegime, ScanSnapshot, ScannerSettings, StockRecord};
pub use source::{GogSheetSource, SheetSource};

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use sizing::SizedStock;
use store::{
    AlertStore, CoveredCallStore, EarningsStore, PositionStore, RoutineStore, SettingsStore,
};

// ---------------------------------------------------------------------------
// CanslimSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`CanslimSdk`] instance.
///
/// Use [`CanslimSdk::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](CanslimSdkBuilder::build) to create the SDK.
pub struct CanslimSdkBuilder {
    data_dir: Option<PathBuf>,
    sheet_id: Option<String>,
    account: Option<String>,
    range: String,
    ttl: Duration,
    fetch_timeout: Duration,
    source: Option<Arc<dyn SheetSource>>,
    record_history: bool,
}

impl Default for CanslimSdkBuilder {
    fn default() -> Self {
        Self {
            data_dir: None,
            sheet_id: None,
            account: None,
            range: config::DEFAULT_RANGE.to_string(),
            ttl: config::DEFAULT_TTL,
            fetch_timeout: config::DEFAULT_FETCH_TIMEOUT,
            source: None,
            record_history: true,
        }
    }
}

impl CanslimSdkBuilder {
    /// Set a custom data directory.
    ///
    /// If not set, the platform-appropriate default is used
    /// (e.g. `~/.local/share/canslim-sdk` on Linux).
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the spreadsheet identifier and account reference for the CLI.
    ///
    /// Both are required unless a custom [`source`](Self::source) is
    /// provided.
    pub fn sheet(mut self, sheet_id: impl Into<String>, account: impl Into<String>) -> Self {
        self.sheet_id = Some(sheet_id.into());
        self.account = Some(account.into());
        self
    }

    /// Override the cell range expression.
    ///
    /// Defaults to [`config::DEFAULT_RANGE`].
    pub fn range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }

    /// Set the cache time-to-live. Defaults to 5 minutes.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Bound one external fetch invocation. Defaults to 30 seconds.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Replace the CLI-backed source with a custom [`SheetSource`].
    ///
    /// Intended for tests and alternative transports; when set, the sheet
    /// id and account are not required.
    pub fn source(mut self, source: Arc<dyn SheetSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Enable or disable recording fetched snapshots to history.
    /// Defaults to `true`.
    pub fn record_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }

    /// Build the SDK, validating the configuration and creating the data
    /// directory layout.
    ///
    /// No fetch happens here; data is fetched lazily on the first
    /// [`snapshot()`](CanslimSdk::snapshot) call.
    pub fn build(self) -> Result<CanslimSdk> {
        let data_dir = self.data_dir.unwrap_or_else(config::default_data_dir);
        fs::create_dir_all(&data_dir)?;

        let source: Arc<dyn SheetSource> = match self.source {
            Some(source) => source,
            None => {
                let sheet_config = SheetConfig {
                    sheet_id: self.sheet_id.unwrap_or_default(),
                    range: self.range,
                    account: self.account.unwrap_or_default(),
                    fetch_timeout: self.fetch_timeout,
                };
                sheet_config.validate()?;
                Arc::new(GogSheetSource::new(sheet_config))
            }
        };

        let history = Arc::new(HistoryStore::open(data_dir.join(config::HISTORY_DIR))?);
        let mut cache = SnapshotCache::new(source, self.ttl);
        if self.record_history {
            cache = cache.with_history(history.clone());
        }

        Ok(CanslimSdk {
            cache,
            history,
            alerts: AlertStore::open(&data_dir),
            earnings: EarningsStore::open(&data_dir),
            settings: SettingsStore::open(&data_dir),
            positions: PositionStore::open(&data_dir),
            calls: CoveredCallStore::open(&data_dir),
            routines: RoutineStore::open(&data_dir)?,
            data_dir,
        })
    }
}

// ---------------------------------------------------------------------------
// CanslimSdk
// ---------------------------------------------------------------------------

/// The main entry point for the CANSLIM scanner SDK.
///
/// Owns the snapshot cache (which owns the sheet source), the snapshot
/// history, and the dashboard's JSON-file stores. Created via
/// [`CanslimSdk::builder()`].
pub struct CanslimSdk {
    data_dir: PathBuf,
    cache: SnapshotCache,
    history: Arc<HistoryStore>,
    alerts: AlertStore,
    earnings: EarningsStore,
    settings: SettingsStore,
    positions: PositionStore,
    calls: CoveredCallStore,
    routines: RoutineStore,
}

impl CanslimSdk {
    /// Create a new builder for configuring the SDK.
    pub fn builder() -> CanslimSdkBuilder {
        CanslimSdkBuilder::default()
    }

    // -- Live data ---------------------------------------------------------

    /// Current scan snapshot, cached within the TTL.
    ///
    /// Serves the stale snapshot (logging the failure) when a refresh
    /// fails and a prior fetch succeeded; propagates the error only
    /// before the first successful fetch.
    pub fn snapshot(&self) -> Result<ScanSnapshot> {
        self.cache.get(false)
    }

    /// Force a refresh, bypassing the TTL.
    pub fn refresh(&self) -> Result<ScanSnapshot> {
        self.cache.get(true)
    }

    /// Age of the cached snapshot, if one exists.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache.age()
    }

    // -- Stores ------------------------------------------------------------

    /// Access the snapshot history store.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Access the price-alert store.
    pub fn alerts(&self) -> &AlertStore {
        &self.alerts
    }

    /// Access the earnings calendar store.
    pub fn earnings(&self) -> &EarningsStore {
        &self.earnings
    }

    /// Access the scanner settings store.
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Access the stock position tracker.
    pub fn positions(&self) -> &PositionStore {
        &self.positions
    }

    /// Access the covered-call tracker.
    pub fn calls(&self) -> &CoveredCallStore {
        &self.calls
    }

    /// Access the daily routine journal.
    pub fn routines(&self) -> &RoutineStore {
        &self.routines
    }

    // -- Derived output ----------------------------------------------------

    /// Export the current snapshot's stock table as CSV, optionally
    /// filtered by ticker substring.
    pub fn export_csv<W: Write>(&self, filter: Option<&str>, out: W) -> Result<()> {
        let snapshot = self.snapshot()?;
        export::write_csv(&snapshot, filter, out)
    }

    /// Size every stock in the current snapshot against the saved
    /// settings.
    pub fn position_plan(&self) -> Result<Vec<SizedStock>> {
        let snapshot = self.snapshot()?;
        let settings = self.settings.get()?;
        Ok(sizing::plan(&snapshot, &settings))
    }

    /// Root of the SDK's data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for CanslimSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CanslimSdk(data_dir={}, source={}, ttl={:?})",
            self.data_dir.display(),
            self.cache.source_name(),
            self.cache.ttl()
        )
    }
}
