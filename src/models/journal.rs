use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoutineSection
// ---------------------------------------------------------------------------

/// The two checklists a trading day is journaled under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutineSection {
    Premarket,
    Postclose,
}

// ---------------------------------------------------------------------------
// DailyRoutine
// ---------------------------------------------------------------------------

/// One trading day's journal: free-form fields per section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRoutine {
    pub date: NaiveDate,
    #[serde(default)]
    pub premarket: BTreeMap<String, String>,
    #[serde(default)]
    pub postclose: BTreeMap<String, String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DailyRoutine {
    /// Empty journal for a day.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            premarket: BTreeMap::new(),
            postclose: BTreeMap::new(),
            updated_at: None,
        }
    }

    pub fn section(&self, section: RoutineSection) -> &BTreeMap<String, String> {
        match section {
            RoutineSection::Premarket => &self.premarket,
            RoutineSection::Postclose => &self.postclose,
        }
    }

    pub fn section_mut(&mut self, section: RoutineSection) -> &mut BTreeMap<String, String> {
        match section {
            RoutineSection::Premarket => &mut self.premarket,
            RoutineSection::Postclose => &mut self.postclose,
        }
    }
}

/// Which sections exist for a journaled day, as shown on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineFlags {
    pub has_premarket: bool,
    pub has_postclose: bool,
}
