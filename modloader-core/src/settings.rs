//! Persisted manager settings

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::entry::ModEntry;
use crate::error::ModLoaderError;

/// Manager settings
///
/// Stored as TOML in `<mods>/ModManager.toml`:
///
/// ```toml
/// shortcut_key_id = 0
/// check_updates = 1
///
/// [[mods]]
/// id = "core"
/// enabled = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub shortcut_key_id: i32,
    pub check_updates: i32,
    /// Saved enabled flag per mod id
    pub mods: Vec<ModSetting>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shortcut_key_id: 0,
            check_updates: 1,
            mods: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModSetting {
    pub id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Settings {
    /// Load settings from a TOML file
    ///
    /// Returns defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ModLoaderError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ModLoaderError::Settings(e.to_string()))
    }

    /// Save settings to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ModLoaderError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ModLoaderError::Settings(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.exists()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Rebuild the per-mod flags from live entries, keeping the other fields
    pub fn capture(&self, entries: &[ModEntry]) -> Self {
        Self {
            shortcut_key_id: self.shortcut_key_id,
            check_updates: self.check_updates,
            mods: entries
                .iter()
                .map(|entry| ModSetting {
                    id: entry.id().to_string(),
                    enabled: entry.is_enabled(),
                })
                .collect(),
        }
    }

    /// Saved enabled flag for `id`, if any
    pub fn is_enabled(&self, id: &str) -> Option<bool> {
        self.mods.iter().find(|m| m.id == id).map(|m| m.enabled)
    }
}
