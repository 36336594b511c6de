//! modloader-core - runtime engine for modloader
//!
//! The [`ModManager`] scans a mods root for packages (a directory with an
//! `info.json` manifest and a code module), orders them by their declared
//! requirements, applies the persisted enable flags and loads each one. Every
//! package becomes a [`ModEntry`] that validates its dependencies, loads its
//! module through a [`ModuleLoader`], runs the manifest's entry point and
//! activates itself through the mod's toggle callback.
//!
//! ```no_run
//! use modloader_core::{ManagerConfig, ModManager};
//!
//! let mut manager = ModManager::new(ManagerConfig::default());
//! if let Some(report) = manager.start() {
//!     println!("{} of {} mods active", report.active, report.found);
//! }
//! if let Some(entry) = manager.find_by_id_mut("addon") {
//!     entry.set_active(false);
//! }
//! ```

pub mod cache;
pub mod discovery;
pub mod entry;
pub mod error;
pub mod loader;
pub mod logger;
pub mod manager;
pub mod order;
pub mod requirement;
pub mod settings;

pub use entry::{EntryLookup, EntryStatus, LoadContext, ModEntry};
pub use error::ModLoaderError;
pub use loader::{CodeModule, ModuleLoader, NativeLoader, StaticLoader};
pub use logger::{ModLog, ModLogger};
pub use manager::{MANAGER_VERSION, ManagerConfig, ModManager, StartReport};
pub use requirement::Requirement;
pub use settings::{ModSetting, Settings};
