//! Shared persistence discipline for the JSON-file-backed stores.
//!
//! Every store document is written to a `.tmp` sibling first and renamed
//! into place, so a reader never observes a partially written file. Each
//! [`JsonFile`] carries its own lock around the read-modify-write
//! sequence; storage-layer failures surface as
//! [`CanslimError::Persistence`], never silently.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CanslimError, Result};

pub(crate) fn persistence(path: &Path, source: std::io::Error) -> CanslimError {
    CanslimError::Persistence {
        path: path.to_path_buf(),
        source,
    }
}

/// Write `bytes` durably: temp file next to the target, then rename.
///
/// The partial temp file is removed on any failure.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| persistence(parent, e))?;
    }

    let tmp = path.with_extension("json.tmp");
    let result = fs::write(&tmp, bytes)
        .map_err(|e| persistence(&tmp, e))
        .and_then(|_| fs::rename(&tmp, path).map_err(|e| persistence(path, e)));

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

// ---------------------------------------------------------------------------
// JsonFile
// ---------------------------------------------------------------------------

/// One JSON document on disk with locked read-modify-write updates.
pub(crate) struct JsonFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, or build the default when the file does not
    /// exist yet.
    pub fn load_or<T, D>(&self, default: D) -> Result<T>
    where
        T: DeserializeOwned,
        D: FnOnce() -> T,
    {
        if !self.path.exists() {
            return Ok(default());
        }
        let bytes = fs::read(&self.path).map_err(|e| persistence(&self.path, e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Read-modify-write under the store lock.
    ///
    /// The mutation's return value is handed back to the caller; when the
    /// mutation fails nothing is written.
    pub fn update<T, D, F, R>(&self, default: D, mutate: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        D: FnOnce() -> T,
        F: FnOnce(&mut T) -> Result<R>,
    {
        let _guard = self.lock.lock().expect("store lock poisoned");
        let mut doc = self.load_or(default)?;
        let out = mutate(&mut doc)?;
        self.save(&doc)?;
        Ok(out)
    }

    fn save<T: Serialize>(&self, doc: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        write_atomic(&self.path, &bytes)
    }
}
