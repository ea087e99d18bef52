//! Daily trading-routine journal: one JSON document per trading day.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use tracing::warn;

use crate::config;
use crate::error::Result;
use crate::models::{DailyRoutine, RoutineFlags, RoutineSection};

use super::json_file::{persistence, write_atomic};

/// Store for the daily routine journal under `routines/`.
pub struct RoutineStore {
    dir: PathBuf,
    // One writer at a time; a day's file is rewritten wholesale on save.
    write_lock: Mutex<()>,
}

impl RoutineStore {
    pub(crate) fn open(data_dir: &Path) -> Result<Self> {
        let dir = data_dir.join(config::ROUTINES_DIR);
        fs::create_dir_all(&dir).map_err(|e| persistence(&dir, e))?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn day_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{date}.json"))
    }

    /// Load a day's journal, empty if never written.
    pub fn load(&self, date: NaiveDate) -> Result<DailyRoutine> {
        let path = self.day_path(date);
        if !path.exists() {
            return Ok(DailyRoutine::empty(date));
        }
        let bytes = fs::read(&path).map_err(|e| persistence(&path, e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Replace one section of a day's journal and stamp the update time.
    pub fn save_section(
        &self,
        date: NaiveDate,
        section: RoutineSection,
        fields: BTreeMap<String, String>,
    ) -> Result<DailyRoutine> {
        let _guard = self.write_lock.lock().expect("routine lock poisoned");
        let mut routine = self.load(date)?;
        *routine.section_mut(section) = fields;
        routine.updated_at = Some(Utc::now());

        let bytes = serde_json::to_vec_pretty(&routine)?;
        write_atomic(&self.day_path(date), &bytes)?;
        Ok(routine)
    }

    /// Which days have journals, and which sections each carries.
    ///
    /// Unparsable files are skipped with a warning, matching the
    /// calendar's best-effort rendering.
    pub fn dates(&self) -> Result<BTreeMap<NaiveDate, RoutineFlags>> {
        let mut dates = BTreeMap::new();
        let dir = fs::read_dir(&self.dir).map_err(|e| persistence(&self.dir, e))?;
        for entry in dir {
            let entry = entry.map_err(|e| persistence(&self.dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(date) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<NaiveDate>().ok())
            else {
                continue;
            };
            match self.load(date) {
                Ok(routine) => {
                    dates.insert(
                        date,
                        RoutineFlags {
                            has_premarket: !routine.premarket.is_empty(),
                            has_postclose: !routine.postclose.is_empty(),
                        },
                    );
                }
                Err(err) => warn!(%date, error = %err, "skipping unreadable routine file"),
            }
        }
        Ok(dates)
    }
}
