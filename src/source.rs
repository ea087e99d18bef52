//! Sheet source abstraction and the `gog` CLI implementation.
//!
//! The external tabular store is reachable only through a command-line tool
//! that authenticates out-of-band and prints the requested range as JSON.
//! The [`SheetSource`] trait keeps the parser and cache testable against an
//! in-memory fake without spawning any process.

use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::config::SheetConfig;
use crate::error::{CanslimError, Result};

/// How often the child process is polled for exit while under deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

// ---------------------------------------------------------------------------
// SheetSource
// ---------------------------------------------------------------------------

/// A row/column tabular store returning a 2D array of cell values.
pub trait SheetSource: Send + Sync {
    /// Human-readable name for diagnostics.
    fn name(&self) -> &str;

    /// Fetch the configured range as rows of cell strings.
    ///
    /// Rows may be ragged (trailing empty cells omitted) exactly as the
    /// source emits them; the ingestion parser owns all interpretation.
    fn fetch(&self) -> Result<Vec<Vec<String>>>;
}

// ---------------------------------------------------------------------------
// GogSheetSource
// ---------------------------------------------------------------------------

/// Production source: shells out to `gog sheets get <id> <range> --json`
/// with the account reference in the child environment.
pub struct GogSheetSource {
    config: SheetConfig,
}

impl GogSheetSource {
    pub fn new(config: SheetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }
}

impl SheetSource for GogSheetSource {
    fn name(&self) -> &str {
        "gog"
    }

    fn fetch(&self) -> Result<Vec<Vec<String>>> {
        let mut child = Command::new("gog")
            .args([
                "sheets",
                "get",
                self.config.sheet_id.as_str(),
                self.config.range.as_str(),
                "--json",
            ])
            .env("GOG_ACCOUNT", &self.config.account)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CanslimError::Upstream(format!("failed to spawn gog: {e}")))?;

        // Poll for exit against the deadline; kill past it. No retries --
        // a timed-out fetch surfaces as an upstream failure and the cache
        // decides whether stale data can cover for it.
        let deadline = Instant::now() + self.config.fetch_timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(CanslimError::Upstream(format!(
                            "gog timed out after {:?}",
                            self.config.fetch_timeout
                        )));
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(CanslimError::Upstream(format!("failed to poll gog: {e}")))
                }
            }
        };

        let mut stdout = String::new();
        if let Some(mut pipe) = child.stdout.take() {
            pipe.read_to_string(&mut stdout)
                .map_err(|e| CanslimError::Upstream(format!("failed to read gog output: {e}")))?;
        }

        if !status.success() {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                let _ = pipe.read_to_string(&mut stderr);
            }
            return Err(CanslimError::Upstream(format!(
                "gog exited with {status}: {}",
                stderr.trim()
            )));
        }

        decode_values(&stdout)
    }
}

// ---------------------------------------------------------------------------
// Payload decoding
// ---------------------------------------------------------------------------

/// Decode the CLI's `{"values": [[...]]}` payload into rows of strings.
///
/// Numeric and boolean cells are stringified (booleans in the sheet's
/// `TRUE`/`FALSE` convention), nulls become empty cells, and a missing
/// `values` key is an empty range, not an error.
pub fn decode_values(payload: &str) -> Result<Vec<Vec<String>>> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| CanslimError::Upstream(format!("unparsable gog output: {e}")))?;

    let rows = match value.get("values") {
        Some(Value::Array(rows)) => rows.clone(),
        _ => Vec::new(),
    };

    Ok(rows
        .into_iter()
        .map(|row| match row {
            Value::Array(cells) => cells.into_iter().map(cell_to_string).collect(),
            _ => Vec::new(),
        })
        .collect())
}

fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => if b { "TRUE" } else { "FALSE" }.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
