//! Durable snapshot history: one JSON document per distinct scan timestamp.
//!
//! Repeated polling of an unchanged sheet must not accumulate duplicates,
//! so a snapshot matching the most recently stored record (by timestamp,
//! and as a safeguard by full content) is skipped. Writes are atomic and
//! history I/O failures always surface -- losing history is a data-loss
//! condition distinct from a cache miss.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CanslimError, Result};
use crate::models::ScanSnapshot;
use crate::store::json_file::{persistence, write_atomic};

// ---------------------------------------------------------------------------
// HistoryEntry
// ---------------------------------------------------------------------------

/// Summary line for one stored snapshot, as listed by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Storage key, usable with [`HistoryStore::load`].
    pub key: String,
    /// The snapshot's scan timestamp.
    pub timestamp: String,
    pub stock_count: usize,
}

// ---------------------------------------------------------------------------
// HistoryStore
// ---------------------------------------------------------------------------

/// Append-mostly store of scan snapshots under a history directory.
pub struct HistoryStore {
    dir: PathBuf,
    // Guards the read-compare-write sequence so two concurrent writers
    // cannot both decide "not a duplicate" and double-write.
    write_lock: Mutex<()>,
}

impl HistoryStore {
    /// Open (creating if needed) the history directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| persistence(&dir, e))?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist a snapshot unless it duplicates the most recent record.
    ///
    /// Returns `true` if a new record was written, `false` if skipped.
    pub fn record(&self, snapshot: &ScanSnapshot) -> Result<bool> {
        let _guard = self.write_lock.lock().expect("history lock poisoned");

        if let Some(latest) = self.latest_unlocked()? {
            if latest.timestamp == snapshot.timestamp || latest == *snapshot {
                return Ok(false);
            }
        }

        let key = format!("scan_{}", sanitize_key(&snapshot.timestamp));
        let path = self.dir.join(format!("{key}.json"));
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        write_atomic(&path, &bytes)?;
        info!(key = %key, stocks = snapshot.stocks.len(), "recorded history snapshot");
        Ok(true)
    }

    /// All stored snapshots, newest first.
    ///
    /// Unreadable records are skipped with a warning; one corrupt file must
    /// not hide the rest of the history.
    pub fn list(&self) -> Result<Vec<HistoryEntry>> {
        let mut entries = Vec::new();
        for key in self.keys_newest_first()? {
            match self.load(&key) {
                Ok(snapshot) => entries.push(HistoryEntry {
                    key,
                    timestamp: snapshot.timestamp,
                    stock_count: snapshot.stocks.len(),
                }),
                Err(err) => warn!(key = %key, error = %err, "skipping unreadable history record"),
            }
        }
        Ok(entries)
    }

    /// Load one stored snapshot by key.
    pub fn load(&self, key: &str) -> Result<ScanSnapshot> {
        if key.contains(['/', '\\']) || key.contains("..") {
            return Err(CanslimError::InvalidArgument(format!(
                "invalid history key {key:?}"
            )));
        }
        let path = self.dir.join(format!("{key}.json"));
        if !path.exists() {
            return Err(CanslimError::NotFound(format!("history record {key}")));
        }
        let bytes = fs::read(&path).map_err(|e| persistence(&path, e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// The most recently stored snapshot, if any.
    pub fn latest(&self) -> Result<Option<ScanSnapshot>> {
        let _guard = self.write_lock.lock().expect("history lock poisoned");
        self.latest_unlocked()
    }

    fn latest_unlocked(&self) -> Result<Option<ScanSnapshot>> {
        match self.keys_newest_first()?.first() {
            Some(key) => self.load(key).map(Some),
            None => Ok(None),
        }
    }

    /// Record keys sorted newest first.
    ///
    /// Keys embed the sanitized scan timestamp, so lexicographic order is
    /// chronological.
    fn keys_newest_first(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let dir = fs::read_dir(&self.dir).map_err(|e| persistence(&self.dir, e))?;
        for entry in dir {
            let entry = entry.map_err(|e| persistence(&self.dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort_unstable_by(|a, b| b.cmp(a));
        Ok(keys)
    }
}

/// Make a scan timestamp filename-safe while keeping lexicographic order.
fn sanitize_key(timestamp: &str) -> String {
    timestamp
        .trim()
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' => c,
            ' ' => '_',
            _ => '-',
        })
        .collect()
}
