//! TTL cache over the sheet source; the single entry point for live data.
//!
//! Requests are lazy: nothing refreshes on a timer, a request past the TTL
//! triggers the fetch. Availability wins over freshness -- once a snapshot
//! has been served, upstream failures downgrade to a logged warning and
//! callers keep getting the stale snapshot.

use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::error::Result;
use crate::history::HistoryStore;
use crate::models::ScanSnapshot;
use crate::parse;
use crate::source::SheetSource;

/// The last successfully parsed snapshot plus the local fetch time
/// (distinct from the snapshot's own scan timestamp).
#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: ScanSnapshot,
    fetched_at: Instant,
}

// ---------------------------------------------------------------------------
// SnapshotCache
// ---------------------------------------------------------------------------

/// Cache of the most recent scan snapshot with a configurable TTL.
///
/// The entry is replaced wholesale on every successful fetch and left
/// untouched on failure; readers never observe a torn snapshot.
pub struct SnapshotCache {
    source: Arc<dyn SheetSource>,
    ttl: Duration,
    entry: RwLock<Option<CacheEntry>>,
    // Serializes refreshes: concurrent misses queue here and share the
    // winner's result instead of issuing redundant fetches.
    refresh_lock: Mutex<()>,
    history: Option<Arc<HistoryStore>>,
}

impl SnapshotCache {
    pub fn new(source: Arc<dyn SheetSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entry: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            history: None,
        }
    }

    /// Offer every newly fetched snapshot to a history store.
    pub fn with_history(mut self, history: Arc<HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Age of the cached snapshot, if any.
    pub fn age(&self) -> Option<Duration> {
        let entry = self.entry.read().expect("cache lock poisoned");
        entry.as_ref().map(|e| e.fetched_at.elapsed())
    }

    /// Get the current snapshot, fetching from the source when the cache
    /// is empty, expired, or `force_refresh` is set.
    ///
    /// On a refresh failure the stale snapshot is returned (and the
    /// failure logged) when one exists; the error propagates only before
    /// the first successful fetch. A history write failure always
    /// propagates, after the cache entry has been replaced -- live data is
    /// never discarded because history failed.
    pub fn get(&self, force_refresh: bool) -> Result<ScanSnapshot> {
        if !force_refresh {
            if let Some(snapshot) = self.fresh() {
                return Ok(snapshot);
            }
        }

        let _guard = self.refresh_lock.lock().expect("refresh lock poisoned");

        // Re-check: a caller that queued behind an in-flight refresh
        // shares its result instead of fetching again.
        if !force_refresh {
            if let Some(snapshot) = self.fresh() {
                return Ok(snapshot);
            }
        }

        match self.fetch_and_replace() {
            Ok(snapshot) => {
                if let Some(history) = &self.history {
                    history.record(&snapshot)?;
                }
                Ok(snapshot)
            }
            Err(err) => {
                let stale = {
                    let entry = self.entry.read().expect("cache lock poisoned");
                    entry.as_ref().map(|e| e.snapshot.clone())
                };
                match stale {
                    Some(snapshot) => {
                        warn!(
                            source = self.source_name(),
                            error = %err,
                            "refresh failed, serving stale snapshot"
                        );
                        Ok(snapshot)
                    }
                    None => Err(err),
                }
            }
        }
    }

    /// Cached snapshot when it is still within the TTL.
    fn fresh(&self) -> Option<ScanSnapshot> {
        let entry = self.entry.read().expect("cache lock poisoned");
        entry
            .as_ref()
            .filter(|e| e.fetched_at.elapsed() < self.ttl)
            .map(|e| e.snapshot.clone())
    }

    /// Fetch, parse, and replace the cache entry wholesale.
    fn fetch_and_replace(&self) -> Result<ScanSnapshot> {
        let raw = self.source.fetch()?;
        let snapshot = parse::parse_cells(&raw)?;

        let mut entry = self.entry.write().expect("cache lock poisoned");
        *entry = Some(CacheEntry {
            snapshot: snapshot.clone(),
            fetched_at: Instant::now(),
        });
        drop(entry);

        info!(
            source = self.source_name(),
            stocks = snapshot.stocks.len(),
            timestamp = %snapshot.timestamp,
            "refreshed scan snapshot"
        );
        Ok(snapshot)
    }
}
