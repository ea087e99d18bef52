//! Shared fixtures for the canslim-sdk integration tests.
//!
//! Provides canonical sheet cell arrays, scripted in-memory sheet sources
//! with fetch counters, and a temp-dir SDK constructor. Callers must keep
//! the returned `TempDir` alive for the duration of the test so the data
//! directory is not deleted prematurely.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use canslim_sdk::{CanslimError, CanslimSdk, Result, SheetSource};

// ---------------------------------------------------------------------------
// Sheet fixtures
// ---------------------------------------------------------------------------

/// Build owned rows from string literals.
pub fn rows(literals: &[&[&str]]) -> Vec<Vec<String>> {
    literals
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

/// The canonical well-formed sheet: two stock rows with every column.
pub fn sample_cells() -> Vec<Vec<String>> {
    rows(&[
        &["CANSLIM Scanner", "Last Scan:", "2024-02-11 08:45:23"],
        &["Market Regime", "", "Distribution Days", "", "Buy Signal"],
        &["Confirmed", "", "2", "", "TRUE"],
        &["Account Balance", "", "Risk Per Trade", "", "Actionable Count"],
        &["$100,000", "", "$1,000", "", "12"],
        &[],
        &[
            "Ticker", "Name", "Score", "C", "A", "N", "S", "L", "I", "M", "RS", "Price", "Pivot",
            "Stop", "Signal",
        ],
        &[
            "AAPL", "Apple Inc", "85", "A", "A", "B", "A", "A", "B", "A", "92", "185.50",
            "190.00", "178.25", "Buy",
        ],
        &[
            "NVDA", "NVIDIA Corp", "97", "A", "A", "A", "A", "A", "A", "A", "99", "720.10",
            "750.00", "690.00", "Watch",
        ],
        &[],
    ])
}

/// Same layout with a different scan timestamp, for history tests.
pub fn sample_cells_at(timestamp: &str) -> Vec<Vec<String>> {
    let mut cells = sample_cells();
    cells[0][2] = timestamp.to_string();
    cells
}

// ---------------------------------------------------------------------------
// Scripted sources
// ---------------------------------------------------------------------------

/// One scripted fetch outcome.
pub enum FakeFetch {
    Cells(Vec<Vec<String>>),
    Fail(String),
}

/// In-memory sheet source that replays a script and counts fetches.
///
/// Once the script is exhausted the final entry repeats.
pub struct FakeSheetSource {
    script: Vec<FakeFetch>,
    cursor: AtomicUsize,
    fetches: AtomicUsize,
}

impl FakeSheetSource {
    pub fn scripted(script: Vec<FakeFetch>) -> Arc<Self> {
        assert!(!script.is_empty(), "script must have at least one entry");
        Arc::new(Self {
            script,
            cursor: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        })
    }

    /// Source that always serves the same cells.
    pub fn always(cells: Vec<Vec<String>>) -> Arc<Self> {
        Self::scripted(vec![FakeFetch::Cells(cells)])
    }

    /// Source that always fails.
    pub fn failing(message: &str) -> Arc<Self> {
        Self::scripted(vec![FakeFetch::Fail(message.to_string())])
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl SheetSource for FakeSheetSource {
    fn name(&self) -> &str {
        "fake"
    }

    fn fetch(&self) -> Result<Vec<Vec<String>>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let step = self.cursor.fetch_add(1, Ordering::SeqCst);
        let step = step.min(self.script.len() - 1);
        match &self.script[step] {
            FakeFetch::Cells(cells) => Ok(cells.clone()),
            FakeFetch::Fail(message) => Err(CanslimError::Upstream(message.clone())),
        }
    }
}

/// Source that sleeps before answering, for single-flight tests.
pub struct SlowSheetSource {
    cells: Vec<Vec<String>>,
    delay: Duration,
    fetches: AtomicUsize,
}

impl SlowSheetSource {
    pub fn new(cells: Vec<Vec<String>>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            cells,
            delay,
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl SheetSource for SlowSheetSource {
    fn name(&self) -> &str {
        "slow-fake"
    }

    fn fetch(&self) -> Result<Vec<Vec<String>>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        Ok(self.cells.clone())
    }
}

// ---------------------------------------------------------------------------
// SDK setup
// ---------------------------------------------------------------------------

/// Build an SDK on a temp data directory over the given source.
pub fn sdk_with_source(
    source: Arc<dyn SheetSource>,
    ttl: Duration,
) -> (CanslimSdk, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let sdk = CanslimSdk::builder()
        .data_dir(tmp.path())
        .source(source)
        .ttl(ttl)
        .build()
        .unwrap();
    (sdk, tmp)
}

/// Build an SDK with no live source, for store-only tests.
pub fn sdk_store_only() -> (CanslimSdk, tempfile::TempDir) {
    sdk_with_source(
        FakeSheetSource::failing("no live source in this test"),
        Duration::ZERO,
    )
}
