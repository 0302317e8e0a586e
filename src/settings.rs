use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DistanceUnits {
    Miles,
    Kilometers,
}

impl Default for DistanceUnits {
    fn default() -> Self {
        DistanceUnits::Miles
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct UserSettings {
    lang: Option<String>,
    units: DistanceUnits,
}

/// User preferences persisted as a JSON file next to the database.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn lang(&self) -> Option<String> {
        self.data.read().unwrap().lang.clone()
    }

    pub fn set_lang(&self, lang: Option<String>) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.lang = lang;
        self.persist(&guard)
    }

    pub fn units(&self) -> DistanceUnits {
        self.data.read().unwrap().units
    }

    pub fn set_units(&self, units: DistanceUnits) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.units = units;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
