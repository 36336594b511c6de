//! ModManager - discovers, orders, loads and tracks mods

use std::path::{Path, PathBuf};
use std::sync::Arc;

use modloader_api::Version;

use crate::discovery::discover;
use crate::entry::{EntryLookup, EntryStatus, LoadContext, ModEntry};
use crate::error::ModLoaderError;
use crate::loader::{ModuleLoader, NativeLoader};
use crate::logger::{MANAGER_SOURCE, ModLog, ModLogger};
use crate::order::sort_entries;
use crate::requirement::parse_version;
use crate::settings::Settings;

/// Version of this mod manager, compared against manifests' `ManagerVersion`.
pub const MANAGER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration for ModManager
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Mods root (`<current dir>/Mods` by default)
    pub mods_dir: PathBuf,
    /// Host version text, parsed at start
    pub host_version: String,
    /// Echo log lines to stdout
    pub echo_console: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            mods_dir: modloader_paths::mods_dir(),
            host_version: MANAGER_VERSION.to_string(),
            echo_console: true,
        }
    }
}

impl ManagerConfig {
    pub fn with_mods_dir(mods_dir: impl Into<PathBuf>) -> Self {
        Self {
            mods_dir: mods_dir.into(),
            ..Self::default()
        }
    }
}

/// Summary of one `start()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartReport {
    /// Package directories containing a manifest
    pub found: usize,
    /// Entries that loaded cleanly
    pub loaded: usize,
    /// Entries active after loading
    pub active: usize,
}

/// Owns every discovered mod entry.
///
/// Entries are ordered so that each comes after its requirements; the order
/// is fixed once scanned.
pub struct ModManager {
    mods_dir: PathBuf,
    host_version_text: String,
    host_version: Version,
    log: Arc<ModLog>,
    logger: ModLogger,
    loader: Box<dyn ModuleLoader>,
    entries: Vec<ModEntry>,
    settings: Settings,
    found: usize,
    started: bool,
}

impl ModManager {
    /// Create a manager that loads native shared libraries
    pub fn new(config: ManagerConfig) -> Self {
        Self::with_loader(config, NativeLoader)
    }

    /// Create a manager with a custom module loader
    pub fn with_loader(config: ManagerConfig, loader: impl ModuleLoader + 'static) -> Self {
        let log = Arc::new(ModLog::new(
            modloader_paths::log_file(&config.mods_dir),
            config.echo_console,
        ));
        let logger = ModLogger::new(MANAGER_SOURCE, log.clone());

        Self {
            mods_dir: config.mods_dir,
            host_version_text: config.host_version,
            host_version: Version::ZERO,
            log,
            logger,
            loader: Box::new(loader),
            entries: Vec::new(),
            settings: Settings::default(),
            found: 0,
            started: false,
        }
    }

    /// Discover, order and load every mod. Runs once.
    ///
    /// Returns `None` if the manager was already started.
    pub fn start(&mut self) -> Option<StartReport> {
        if self.started {
            self.logger.info("Cancel start. Already started.");
            return None;
        }
        self.started = true;

        self.log.clear();
        self.logger
            .info(format!("Version '{}'. Initialize.", self.host_version_text));
        self.host_version = parse_version(&self.host_version_text, &self.logger);

        if !self.mods_dir.is_dir() {
            if let Err(e) = std::fs::create_dir_all(&self.mods_dir) {
                self.logger.error(format!(
                    "Error creating '{}'.",
                    self.mods_dir.display()
                ));
                self.logger.error(e.to_string());
            }
            return Some(StartReport::default());
        }

        let found = self.discover_entries();
        if !self.entries.is_empty() {
            self.logger.info("Loading mods.");
            self.load_all();
        }

        let report = StartReport {
            found,
            loaded: self
                .entries
                .iter()
                .filter(|e| e.status() == EntryStatus::Loaded)
                .count(),
            active: self.active_count(),
        };
        self.logger.info(format!(
            "Finish. Found {} mods. Successful loaded {} mods.",
            report.found, report.active
        ));
        tracing::debug!(?report, "Mod manager started");
        Some(report)
    }

    /// Discover, order and apply saved flags without loading any module.
    ///
    /// Returns the number of packages with a manifest. Does nothing once the
    /// manager has started.
    pub fn scan(&mut self) -> usize {
        if !self.started {
            self.discover_entries();
        }
        self.found
    }

    fn discover_entries(&mut self) -> usize {
        self.logger.info("Parsing mods.");
        let discovery = discover(&self.mods_dir, &self.logger);
        self.found = discovery.found;

        let entries: Vec<ModEntry> = discovery
            .packages
            .into_iter()
            .map(|package| ModEntry::new(package.manifest, package.dir, self.log.clone()))
            .collect();

        if entries.is_empty() {
            self.entries = entries;
            return self.found;
        }

        self.logger.info("Sorting mods.");
        self.entries = sort_entries(entries);

        self.settings = match Settings::load(&self.settings_path()) {
            Ok(settings) => settings,
            Err(e) => {
                self.logger.error("Error loading settings.");
                self.logger.error(e.to_string());
                Settings::default()
            }
        };
        for entry in &mut self.entries {
            if let Some(enabled) = self.settings.is_enabled(entry.id()) {
                entry.set_enabled(enabled);
            }
        }

        self.found
    }

    fn load_all(&mut self) {
        let host_version = self.host_version;
        let loader = self.loader.as_ref();
        for index in 0..self.entries.len() {
            with_siblings(&mut self.entries, index, |current, siblings| {
                let ctx = LoadContext {
                    host_version,
                    loader,
                    entries: siblings,
                };
                current.load(&ctx)
            });
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&ModEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut ModEntry> {
        self.entries.iter_mut().find(|e| e.id() == id)
    }

    /// Entries in load order
    pub fn entries(&self) -> &[ModEntry] {
        &self.entries
    }

    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_active()).count()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Parsed host version; `0.0.0` until started
    pub fn host_version(&self) -> Version {
        self.host_version
    }

    pub fn mods_dir(&self) -> &Path {
        &self.mods_dir
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log.path()
    }

    pub fn settings_path(&self) -> PathBuf {
        modloader_paths::settings_file(&self.mods_dir)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Set a mod's enabled flag. Takes effect for loading on the next start;
    /// call [`ModManager::save_settings`] to persist it.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<(), ModLoaderError> {
        let entry = self
            .find_by_id_mut(id)
            .ok_or_else(|| ModLoaderError::NotFound { id: id.to_string() })?;
        entry.set_enabled(enabled);
        Ok(())
    }

    /// Toggle a loaded mod at runtime. Its callback can see every other
    /// entry through `find_peer`. Returns the resulting active state.
    pub fn set_active(&mut self, id: &str, value: bool) -> Result<bool, ModLoaderError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| ModLoaderError::NotFound { id: id.to_string() })?;
        with_siblings(&mut self.entries, index, |entry, siblings| {
            entry.set_active_with(value, siblings);
            entry.is_active()
        })
        .ok_or_else(|| ModLoaderError::NotFound { id: id.to_string() })
    }

    /// Rebuild the settings from the live entries and write them.
    pub fn save_settings(&mut self) -> Result<(), ModLoaderError> {
        self.settings = self.settings.capture(&self.entries);
        self.settings.save(&self.settings_path())?;
        tracing::debug!(path = %self.settings_path().display(), "Saved mod settings");
        Ok(())
    }
}

/// Every entry except the one being loaded.
struct Siblings<'a> {
    before: &'a [ModEntry],
    after: &'a [ModEntry],
}

impl EntryLookup for Siblings<'_> {
    fn find_entry(&self, id: &str) -> Option<&ModEntry> {
        self.before
            .iter()
            .chain(self.after)
            .find(|e| e.id() == id)
    }
}

/// Run `f` on `entries[index]` with read access to all the other entries.
fn with_siblings<R>(
    entries: &mut [ModEntry],
    index: usize,
    f: impl FnOnce(&mut ModEntry, &Siblings<'_>) -> R,
) -> Option<R> {
    let (before, rest) = entries.split_at_mut(index);
    let (current, after) = rest.split_first_mut()?;
    let siblings = Siblings {
        before: &*before,
        after: &*after,
    };
    Some(f(current, &siblings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &Path) -> ManagerConfig {
        ManagerConfig {
            mods_dir: dir.to_path_buf(),
            host_version: "0.12.2".to_string(),
            echo_console: false,
        }
    }

    fn write_package(root: &Path, id: &str, extra: &str) {
        let package = root.join(id);
        std::fs::create_dir_all(&package).unwrap();
        std::fs::write(
            package.join("info.json"),
            format!(r#"{{"Id": "{id}", "Version": "1.0.0"{extra}}}"#),
        )
        .unwrap();
    }

    #[test]
    fn test_manager_version_matches_crate() {
        assert_eq!(MANAGER_VERSION.parse::<Version>().unwrap(), Version::new(0, 12, 2));
    }

    #[test]
    fn test_config_with_mods_dir() {
        let config = ManagerConfig::with_mods_dir("/tmp/mods");
        assert_eq!(config.mods_dir, PathBuf::from("/tmp/mods"));
        assert_eq!(config.host_version, MANAGER_VERSION);
    }

    #[test]
    fn test_start_creates_missing_mods_dir() {
        let dir = TempDir::new().unwrap();
        let mods = dir.path().join("Mods");
        let mut manager = ModManager::new(config(&mods));

        let report = manager.start().unwrap();

        assert_eq!(report, StartReport::default());
        assert!(mods.is_dir());
        assert!(manager.is_started());
        assert!(manager.entries().is_empty());
    }

    #[test]
    fn test_second_start_is_cancelled() {
        let dir = TempDir::new().unwrap();
        let mut manager = ModManager::new(config(dir.path()));

        assert!(manager.start().is_some());
        assert!(manager.start().is_none());

        let log = std::fs::read_to_string(dir.path().join("ModManager.log")).unwrap();
        assert!(log.contains("[Manager] Cancel start. Already started."));
    }

    #[test]
    fn test_start_clears_previous_log() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ModManager.log"), "stale\n").unwrap();
        let mut manager = ModManager::new(config(dir.path()));

        manager.start();

        let log = std::fs::read_to_string(dir.path().join("ModManager.log")).unwrap();
        assert!(!log.contains("stale"));
        assert!(log.starts_with("[Manager] Version '0.12.2'. Initialize."));
        assert_eq!(manager.host_version(), Version::new(0, 12, 2));
    }

    #[test]
    fn test_scan_orders_and_applies_settings() {
        let dir = TempDir::new().unwrap();
        write_package(dir.path(), "addon", r#", "Requirements": ["core"]"#);
        write_package(dir.path(), "core", "");
        std::fs::write(
            dir.path().join("ModManager.toml"),
            "[[mods]]\nid = \"addon\"\nenabled = false\n",
        )
        .unwrap();
        let mut manager = ModManager::new(config(dir.path()));

        assert_eq!(manager.scan(), 2);

        let ids: Vec<_> = manager.entries().iter().map(ModEntry::id).collect();
        assert_eq!(ids, vec!["core", "addon"]);
        assert!(!manager.find_by_id("addon").unwrap().is_enabled());
        assert!(manager.find_by_id("core").unwrap().is_enabled());
        assert_eq!(
            manager.find_by_id("core").unwrap().status(),
            EntryStatus::Pending
        );
    }

    #[test]
    fn test_set_enabled_and_save() {
        let dir = TempDir::new().unwrap();
        write_package(dir.path(), "core", "");
        let mut manager = ModManager::new(config(dir.path()));
        manager.scan();

        manager.set_enabled("core", false).unwrap();
        manager.save_settings().unwrap();

        let saved = Settings::load(&dir.path().join("ModManager.toml")).unwrap();
        assert_eq!(saved.is_enabled("core"), Some(false));
    }

    #[test]
    fn test_set_enabled_unknown_id() {
        let dir = TempDir::new().unwrap();
        let mut manager = ModManager::new(config(dir.path()));

        let result = manager.set_enabled("ghost", true);
        assert!(matches!(result, Err(ModLoaderError::NotFound { .. })));
    }

    #[test]
    fn test_set_active_unknown_id() {
        let dir = TempDir::new().unwrap();
        let mut manager = ModManager::new(config(dir.path()));

        let result = manager.set_active("ghost", true);
        assert!(matches!(result, Err(ModLoaderError::NotFound { .. })));
    }

    #[test]
    fn test_set_active_on_unloaded_entry_is_refused() {
        let dir = TempDir::new().unwrap();
        write_package(dir.path(), "core", "");
        let mut manager = ModManager::new(config(dir.path()));
        manager.scan();

        assert!(!manager.set_active("core", true).unwrap());
        assert!(!manager.find_by_id("core").unwrap().is_active());
    }

    #[test]
    fn test_invalid_settings_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        write_package(dir.path(), "core", "");
        std::fs::write(dir.path().join("ModManager.toml"), "mods = 3").unwrap();
        let mut manager = ModManager::new(config(dir.path()));

        manager.scan();

        assert!(manager.find_by_id("core").unwrap().is_enabled());
        assert_eq!(manager.settings(), &Settings::default());
    }

    #[test]
    fn test_siblings_lookup_skips_current() {
        let log = Arc::new(ModLog::detached());
        let entry = |id: &str| {
            let manifest = modloader_api::Manifest {
                id: id.to_string(),
                ..Default::default()
            };
            ModEntry::new(manifest, format!("/mods/{id}"), log.clone())
        };
        let before = vec![entry("a")];
        let after = vec![entry("c")];
        let siblings = Siblings {
            before: &before,
            after: &after,
        };

        assert!(siblings.find_entry("a").is_some());
        assert!(siblings.find_entry("c").is_some());
        assert!(siblings.find_entry("b").is_none());
    }
}
