//! Mods directory layout for modloader.
//!
//! Every file the runtime touches lives directly under a single mods root:
//!
//! ```text
//! Mods/
//! ├── ModManager.log     shared log, cleared on every start
//! ├── ModManager.toml    persisted enable flags
//! └── <package>/
//!     ├── info.json      manifest
//!     └── <module>       shared library named by the manifest
//! ```

use std::path::{Path, PathBuf};

/// Environment variable that overrides the mods root.
pub const MODS_DIR_ENV: &str = "MODLOADER_MODS_DIR";

/// Name of the mods root relative to the host's working directory.
pub const MODS_DIR_NAME: &str = "Mods";

/// Manifest file expected in every package directory.
pub const MANIFEST_FILE: &str = "info.json";

/// Shared log file name.
pub const LOG_FILE: &str = "ModManager.log";

/// Persisted settings file name.
pub const SETTINGS_FILE: &str = "ModManager.toml";

/// Get the mods root directory.
///
/// Returns `$MODLOADER_MODS_DIR` if set, otherwise `<current dir>/Mods`.
/// When the working directory cannot be read, falls back to the platform's
/// local data directory.
///
/// # Examples
///
/// ```
/// use modloader_paths::mods_dir;
///
/// let mods = mods_dir();
/// let log = mods.join("ModManager.log");
/// ```
pub fn mods_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(MODS_DIR_ENV) {
        PathBuf::from(dir)
    } else if let Ok(cwd) = std::env::current_dir() {
        cwd.join(MODS_DIR_NAME)
    } else if let Some(data) = dirs::data_local_dir() {
        data.join("modloader").join(MODS_DIR_NAME)
    } else {
        PathBuf::from(MODS_DIR_NAME)
    }
}

/// Path of the shared log file under a mods root.
pub fn log_file(mods_dir: &Path) -> PathBuf {
    mods_dir.join(LOG_FILE)
}

/// Path of the settings file under a mods root.
pub fn settings_file(mods_dir: &Path) -> PathBuf {
    mods_dir.join(SETTINGS_FILE)
}

/// Path of the manifest inside a package directory.
pub fn manifest_file(package_dir: &Path) -> PathBuf {
    package_dir.join(MANIFEST_FILE)
}

/// Platform file name for a module called `stem`.
pub fn module_file_name(stem: &str) -> String {
    format!("{}.{}", stem, std::env::consts::DLL_EXTENSION)
}
