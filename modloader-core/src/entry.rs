//! ModEntry - one mod's loaded state and lifecycle

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use modloader_api::{
    EntryHandle, LogLevel, Manifest, MethodFn, MethodReturn, ModError, ParamType, PeerInfo,
    ToggleFn, Version,
};

use crate::cache::MethodCache;
use crate::loader::{CodeModule, ModuleLoader};
use crate::logger::{ModLog, ModLogger};
use crate::requirement::{Requirement, parse_requirements, parse_version};

/// Read access to the other entries, for dependency checks.
pub trait EntryLookup {
    fn find_entry(&self, id: &str) -> Option<&ModEntry>;
}

impl EntryLookup for Vec<ModEntry> {
    fn find_entry(&self, id: &str) -> Option<&ModEntry> {
        self.iter().find(|e| e.id() == id)
    }
}

/// Lookup with no other entries, for calls made outside a manager.
struct NoPeers;

impl EntryLookup for NoPeers {
    fn find_entry(&self, _id: &str) -> Option<&ModEntry> {
        None
    }
}

/// What an entry needs from its manager while loading.
pub struct LoadContext<'a> {
    /// Version of the running manager
    pub host_version: Version,
    pub loader: &'a dyn ModuleLoader,
    pub entries: &'a dyn EntryLookup,
}

/// Summary of an entry's load flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// `load()` has not run
    Pending,
    /// Validation or module loading failed; the entry point never ran
    Failed,
    /// The entry point ran but declined or failed
    Declined,
    /// Loaded cleanly, active or not
    Loaded,
}

/// A discovered mod.
///
/// Created once at discovery. `load()` runs at most once to completion;
/// afterwards only `enabled` (user choice) and `active` (through
/// [`ModEntry::set_active`]) change.
pub struct ModEntry {
    manifest: Manifest,
    path: PathBuf,
    version: Version,
    manager_version: Version,
    requirements: Vec<Requirement>,
    logger: ModLogger,
    /// Declared before `module`: the callback's code lives in the module.
    on_toggle: Option<ToggleFn>,
    cache: MethodCache,
    module: Option<Box<dyn CodeModule>>,
    started: bool,
    load_errored: bool,
    enabled: bool,
    active: bool,
}

impl ModEntry {
    pub fn new(manifest: Manifest, path: impl Into<PathBuf>, log: Arc<ModLog>) -> Self {
        let logger = ModLogger::new(manifest.id.clone(), log);
        let version = parse_version(&manifest.version, &logger);
        let manager_version = manifest
            .required_manager_version()
            .map_or(Version::ZERO, |text| parse_version(text, &logger));
        let requirements = parse_requirements(&manifest.requirements);

        Self {
            manifest,
            path: path.into(),
            version,
            manager_version,
            requirements,
            logger,
            on_toggle: None,
            cache: MethodCache::new(),
            module: None,
            started: false,
            load_errored: false,
            enabled: true,
            active: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.manifest.id
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Minimum manager version, `0.0.0` when unconstrained
    pub fn manager_version(&self) -> Version {
        self.manager_version
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn logger(&self) -> &ModLogger {
        &self.logger
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_load_errored(&self) -> bool {
        self.load_errored
    }

    /// Whether the code module has been loaded
    pub fn has_module(&self) -> bool {
        self.module.is_some()
    }

    /// Whether a toggle callback is registered
    pub fn is_toggleable(&self) -> bool {
        self.on_toggle.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set the persisted enabled flag. Does not change `active`.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Snapshot of this entry as seen by other mods
    pub fn peer_info(&self) -> PeerInfo {
        PeerInfo {
            id: self.manifest.id.clone(),
            version: self.version,
            enabled: self.enabled,
            active: self.active,
        }
    }

    pub fn status(&self) -> EntryStatus {
        match (self.started, self.load_errored) {
            (true, false) => EntryStatus::Loaded,
            (true, true) => EntryStatus::Declined,
            (false, true) => EntryStatus::Failed,
            (false, false) => EntryStatus::Pending,
        }
    }

    /// Mark the entry failed before loading, e.g. when it sits on a
    /// dependency cycle.
    pub(crate) fn reject(&mut self, reason: &str) {
        self.logger.error(reason);
        self.load_errored = true;
    }

    /// Validate, load the module, run the entry point and activate.
    ///
    /// Returns `true` only when the entry loaded cleanly and was eligible for
    /// activation. Once the entry has run (or failed) the remembered outcome
    /// is returned without repeating any work.
    pub fn load(&mut self, ctx: &LoadContext<'_>) -> bool {
        if self.started {
            return !self.load_errored;
        }
        if self.load_errored {
            return false;
        }

        self.logger
            .info(format!("Version '{}'. Loading.", self.manifest.version));

        let mut failed = false;
        if self.manifest.module_file().is_none() {
            failed = true;
            self.logger.error("AssemblyName is null.");
        }
        if self.manifest.entry_point().is_none() {
            failed = true;
            self.logger.error("EntryMethod is null.");
        }
        if let Some(required) = self.manifest.required_manager_version() {
            if self.manager_version > ctx.host_version {
                failed = true;
                self.logger.error(format!(
                    "Mod Manager must be version '{required}' or higher."
                ));
            }
        }
        if !self.check_requirements(ctx.entries) {
            failed = true;
        }

        let (Some(file_name), Some(entry_point)) =
            (self.manifest.module_file(), self.manifest.entry_point())
        else {
            self.load_errored = true;
            return false;
        };
        if failed {
            self.load_errored = true;
            return false;
        }

        let module_path = self.path.join(file_name);
        let entry_point = entry_point.to_string();

        if !module_path.is_file() {
            self.load_errored = true;
            self.logger
                .error(format!("'{}' not found.", module_path.display()));
            return false;
        }

        if self.module.is_none() {
            match ctx.loader.load(&module_path) {
                Ok(module) => self.module = Some(module),
                Err(e) => {
                    self.load_errored = true;
                    self.logger
                        .error(format!("Error loading file '{}'.", module_path.display()));
                    self.logger.error(e.to_string());
                    return false;
                }
            }
        }

        let params: &[ParamType] =
            if self.find_method(&entry_point, &[ParamType::Entry], true).is_some() {
                &[ParamType::Entry]
            } else {
                &[]
            };
        let accepted = self
            .invoke_with(&entry_point, params, ctx.entries)
            .is_some_and(|value| !value.is_declined());
        if !accepted {
            self.load_errored = true;
            self.logger.info("Not loaded.");
        }

        self.started = true;
        if !self.load_errored && self.enabled {
            self.set_active_with(true, ctx.entries);
            return true;
        }
        false
    }

    fn check_requirements(&self, entries: &dyn EntryLookup) -> bool {
        let mut satisfied = true;
        for requirement in &self.requirements {
            let id = &requirement.id;
            let Some(target) = entries.find_entry(id).filter(|t| t.has_module()) else {
                satisfied = false;
                self.logger.error(format!("Required mod '{id}' not loaded."));
                continue;
            };

            if !target.is_enabled() {
                satisfied = false;
                self.logger.error(format!("Required mod '{id}' disabled."));
                continue;
            }
            if !target.is_active() {
                self.logger.info(format!("Required mod '{id}' inactive."));
                continue;
            }
            if let Some(min) = requirement.min_version {
                if min > target.version() {
                    satisfied = false;
                    self.logger.error(format!(
                        "Required mod '{id}' must be version '{min}' or higher."
                    ));
                }
            }
        }
        satisfied
    }

    /// Resolve an exported method of this entry's module.
    pub fn find_method(
        &mut self,
        specifier: &str,
        params: &[ParamType],
        quiet: bool,
    ) -> Option<MethodFn> {
        self.cache.find(
            self.module.as_deref(),
            specifier,
            params,
            &self.logger,
            quiet,
        )
    }

    /// Call an exported method of this entry's module with no peers visible.
    pub fn invoke(&mut self, specifier: &str, params: &[ParamType]) -> Option<MethodReturn> {
        self.invoke_with(specifier, params, &NoPeers)
    }

    /// Call an exported method of this entry's module.
    ///
    /// A method taking [`ParamType::Entry`] receives this entry, able to query
    /// `peers`. Returns `None` after logging when the method cannot be
    /// resolved, returns an error, or panics.
    pub fn invoke_with(
        &mut self,
        specifier: &str,
        params: &[ParamType],
        peers: &dyn EntryLookup,
    ) -> Option<MethodReturn> {
        let method = self.find_method(specifier, params, false)?;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match method {
            MethodFn::Static(f) => f(),
            MethodFn::WithEntry(f) => f(&mut BoundEntry {
                entry: &mut *self,
                peers,
            }),
        }));

        match outcome {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                self.logger
                    .error(format!("Error trying to call '{specifier}'."));
                self.logger.error(e.to_string());
                None
            }
            Err(payload) => {
                self.logger
                    .error(format!("Error trying to call '{specifier}'."));
                self.logger.error(panic_message(payload.as_ref()));
                None
            }
        }
    }

    /// Request activation (`true`) or deactivation (`false`) with no peers
    /// visible to the toggle callback.
    pub fn set_active(&mut self, value: bool) {
        self.set_active_with(value, &NoPeers);
    }

    /// Request activation (`true`) or deactivation (`false`).
    ///
    /// No-op unless the entry loaded cleanly. Activation is granted when no
    /// toggle callback is registered; deactivation always needs a callback
    /// that agrees. The callback can query `peers`.
    pub fn set_active_with(&mut self, value: bool, peers: &dyn EntryLookup) {
        if !self.started || self.load_errored || self.active == value {
            return;
        }

        let granted = match self.on_toggle.take() {
            None => value,
            Some(callback) => {
                let outcome = {
                    let handle = BoundEntry {
                        entry: &mut *self,
                        peers,
                    };
                    panic::catch_unwind(AssertUnwindSafe(|| callback(&handle, value)))
                        .unwrap_or_else(|payload| {
                            Err(ModError::custom(panic_message(payload.as_ref())))
                        })
                };
                self.on_toggle = Some(callback);

                match outcome {
                    Ok(granted) => granted,
                    Err(e) => {
                        self.logger
                            .error("Error trying to call 'OnToggle' function.");
                        self.logger.error(e.to_string());
                        return;
                    }
                }
            }
        };

        if granted {
            self.active = value;
            self.logger
                .info(if value { "Active." } else { "Inactive." });
        }
    }
}

/// The handle mod code receives: its own entry plus read access to peers.
struct BoundEntry<'a> {
    entry: &'a mut ModEntry,
    peers: &'a dyn EntryLookup,
}

impl EntryHandle for BoundEntry<'_> {
    fn manifest(&self) -> &Manifest {
        &self.entry.manifest
    }

    fn path(&self) -> &Path {
        &self.entry.path
    }

    fn version(&self) -> Version {
        self.entry.version
    }

    fn is_enabled(&self) -> bool {
        self.entry.enabled
    }

    fn is_active(&self) -> bool {
        self.entry.active
    }

    fn log(&self, level: LogLevel, message: &str) {
        self.entry.logger.log(level, message);
    }

    fn set_on_toggle(&mut self, callback: ToggleFn) {
        self.entry.on_toggle = Some(callback);
    }

    fn find_peer(&self, id: &str) -> Option<PeerInfo> {
        if id == self.entry.id() {
            return Some(self.entry.peer_info());
        }
        self.peers.find_entry(id).map(ModEntry::peer_info)
    }
}

impl std::fmt::Debug for ModEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModEntry")
            .field("id", &self.manifest.id)
            .field("version", &self.version)
            .field("path", &self.path)
            .field("status", &self.status())
            .field("enabled", &self.enabled)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}
