//! EntryHandle - a mod's view of its own runtime entry

use std::fmt;
use std::path::Path;

use crate::error::ModError;
use crate::manifest::Manifest;
use crate::version::Version;

/// Severity of a log line written through an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Tag written after the source prefix, `None` for plain info lines
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            LogLevel::Info => None,
            LogLevel::Warning => Some("Warning"),
            LogLevel::Error => Some("Error"),
            LogLevel::Critical => Some("Critical"),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag().unwrap_or("Info"))
    }
}

/// Read-only snapshot of another mod's runtime state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerInfo {
    pub id: String,
    pub version: Version,
    /// Whether the user has the mod enabled
    pub enabled: bool,
    /// Whether the mod is currently active
    pub active: bool,
}

/// Callback arbitrating activation requests.
///
/// Called with the entry and `true` when the host wants the mod active,
/// `false` when it wants it inactive. Returning `Ok(true)` grants the change.
pub type ToggleFn = Box<dyn Fn(&dyn EntryHandle, bool) -> Result<bool, ModError> + Send + Sync>;

/// A mod's handle to its own entry.
///
/// Passed to entry points declared with a single entry parameter, and to
/// toggle callbacks.
///
/// # Example
///
/// ```ignore
/// fn load(entry: &mut dyn EntryHandle) -> MethodResult {
///     entry.log_info("Hello from my mod");
///     entry.set_on_toggle(Box::new(|entry, active| {
///         // only switch on while `core` is active
///         Ok(!active || entry.find_peer("core").is_some_and(|core| core.active))
///     }));
///     Ok(MethodReturn::Unit)
/// }
/// ```
pub trait EntryHandle {
    /// The manifest this entry was created from
    fn manifest(&self) -> &Manifest;

    /// Package directory containing the manifest
    fn path(&self) -> &Path;

    /// Parsed mod version
    fn version(&self) -> Version;

    /// Whether the user has the mod enabled
    fn is_enabled(&self) -> bool;

    /// Whether the mod is currently active
    fn is_active(&self) -> bool;

    /// Write a line to the shared mod log under this entry's id
    fn log(&self, level: LogLevel, message: &str);

    /// Register the callback that arbitrates activation
    fn set_on_toggle(&mut self, callback: ToggleFn);

    /// Look up another discovered mod by id. Asking for this mod's own id
    /// returns its own state.
    fn find_peer(&self, id: &str) -> Option<PeerInfo>;

    /// Mod identifier
    fn id(&self) -> &str {
        &self.manifest().id
    }

    fn log_info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn log_warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    fn log_error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn log_critical(&self, message: &str) {
        self.log(LogLevel::Critical, message);
    }
}
