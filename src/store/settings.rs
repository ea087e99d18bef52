//! Scanner settings persisted as a single JSON document.

use std::path::Path;

use crate::config;
use crate::error::Result;
use crate::models::ScannerSettings;

use super::json_file::JsonFile;

/// Store for the dashboard's risk settings.
pub struct SettingsStore {
    file: JsonFile,
}

impl SettingsStore {
    pub(crate) fn open(data_dir: &Path) -> Self {
        Self {
            file: JsonFile::new(data_dir.join(config::SETTINGS_FILE)),
        }
    }

    /// Current settings; missing file or missing keys fall back to
    /// defaults.
    pub fn get(&self) -> Result<ScannerSettings> {
        self.file.load_or(ScannerSettings::default)
    }

    /// Apply a mutation to the settings and persist the result.
    pub fn update<F>(&self, mutate: F) -> Result<ScannerSettings>
    where
        F: FnOnce(&mut ScannerSettings),
    {
        self.file.update(ScannerSettings::default, |settings| {
            mutate(settings);
            Ok(settings.clone())
        })
    }

    /// Replace the settings wholesale.
    pub fn set(&self, settings: ScannerSettings) -> Result<()> {
        self.file.update(ScannerSettings::default, |doc| {
            *doc = settings;
            Ok(())
        })
    }
}
