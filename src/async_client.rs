//! Async wrapper around [`CanslimSdk`] for use in async runtimes (Tokio).
//!
//! Runs all SDK operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free
//! while the CLI fetch or file I/O blocks.
//!
//! # Example
//!
//! ```no_run
//! # use canslim_sdk::AsyncCanslimSdk;
//! # async fn example() -> canslim_sdk::Result<()> {
//! let sdk = AsyncCanslimSdk::builder()
//!     .sheet("1AbCdEfGhIjK", "scanner@example.com")
//!     .build()
//!     .await?;
//!
//! let snapshot = sdk.snapshot().await?;
//!
//! // Run any sync SDK method via closure
//! let alerts = sdk.run(|s| s.alerts().list()).await?;
//! println!("{} stocks, {} alerts", snapshot.stocks.len(), alerts.len());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{CanslimError, Result};
use crate::history::HistoryEntry;
use crate::models::ScanSnapshot;
use crate::source::SheetSource;
use crate::CanslimSdk;

// ---------------------------------------------------------------------------
// AsyncCanslimSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncCanslimSdk`] instance.
#[derive(Default)]
pub struct AsyncCanslimSdkBuilder {
    data_dir: Option<PathBuf>,
    sheet_id: Option<String>,
    account: Option<String>,
    range: Option<String>,
    ttl: Option<Duration>,
    fetch_timeout: Option<Duration>,
    source: Option<Arc<dyn SheetSource>>,
}

impl AsyncCanslimSdkBuilder {
    /// Set a custom data directory.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the spreadsheet identifier and account reference for the CLI.
    pub fn sheet(mut self, sheet_id: impl Into<String>, account: impl Into<String>) -> Self {
        self.sheet_id = Some(sheet_id.into());
        self.account = Some(account.into());
        self
    }

    /// Override the cell range expression.
    pub fn range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    /// Set the cache time-to-live.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Bound one external fetch invocation.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Replace the CLI-backed source with a custom [`SheetSource`].
    pub fn source(mut self, source: Arc<dyn SheetSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Build the async SDK.
    ///
    /// Initialization (directory creation, config validation) runs on the
    /// blocking thread pool so it won't block the async event loop.
    pub async fn build(self) -> Result<AsyncCanslimSdk> {
        tokio::task::spawn_blocking(move || {
            let mut builder = CanslimSdk::builder();
            if let Some(dir) = self.data_dir {
                builder = builder.data_dir(dir);
            }
            if let (Some(sheet_id), Some(account)) = (self.sheet_id, self.account) {
                builder = builder.sheet(sheet_id, account);
            }
            if let Some(range) = self.range {
                builder = builder.range(range);
            }
            if let Some(ttl) = self.ttl {
                builder = builder.ttl(ttl);
            }
            if let Some(timeout) = self.fetch_timeout {
                builder = builder.fetch_timeout(timeout);
            }
            if let Some(source) = self.source {
                builder = builder.source(source);
            }
            let sdk = builder.build()?;
            Ok(AsyncCanslimSdk {
                inner: Arc::new(sdk),
            })
        })
        .await
        .map_err(|e| CanslimError::InvalidArgument(format!("task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncCanslimSdk
// ---------------------------------------------------------------------------

/// Async wrapper around [`CanslimSdk`].
///
/// The underlying SDK is already `Sync` (its cache and stores carry their
/// own locks), so operations share one `Arc` and run concurrently on the
/// blocking pool; the cache still guarantees at most one in-flight fetch.
pub struct AsyncCanslimSdk {
    inner: Arc<CanslimSdk>,
}

impl AsyncCanslimSdk {
    /// Create a new builder for configuring the async SDK.
    pub fn builder() -> AsyncCanslimSdkBuilder {
        AsyncCanslimSdkBuilder::default()
    }

    /// Run a sync SDK operation on the blocking thread pool.
    ///
    /// The closure receives an `&CanslimSdk` reference and should return
    /// a `Result<T>`.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&CanslimSdk) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sdk = self.inner.clone();
        tokio::task::spawn_blocking(move || f(&sdk))
            .await
            .map_err(|e| CanslimError::InvalidArgument(format!("task join error: {e}")))?
    }

    /// Current scan snapshot, cached within the TTL.
    pub async fn snapshot(&self) -> Result<ScanSnapshot> {
        self.run(|s| s.snapshot()).await
    }

    /// Force a refresh, bypassing the TTL.
    pub async fn refresh(&self) -> Result<ScanSnapshot> {
        self.run(|s| s.refresh()).await
    }

    /// List stored history snapshots, newest first.
    pub async fn history_list(&self) -> Result<Vec<HistoryEntry>> {
        self.run(|s| s.history().list()).await
    }

    /// Export the current snapshot as CSV into an in-memory buffer.
    pub async fn export_csv(&self, filter: Option<String>) -> Result<Vec<u8>> {
        self.run(move |s| {
            let mut buf = Vec::new();
            s.export_csv(filter.as_deref(), &mut buf)?;
            Ok(buf)
        })
        .await
    }
}
