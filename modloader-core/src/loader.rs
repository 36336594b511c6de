//! Module loaders - turn a module file into an export table

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use modloader_api::{API_VERSION, API_VERSION_SYMBOL, EXPORTS_SYMBOL, ExportTable};

use crate::error::ModLoaderError;

/// A loaded code module.
pub trait CodeModule: Send + Sync {
    /// The module's exported methods
    fn exports(&self) -> &ExportTable;
}

/// Loads the code module at a path inside a package directory.
pub trait ModuleLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Box<dyn CodeModule>, ModLoaderError>;
}

/// Loads native shared libraries built with `modloader_api::export_mod!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLoader;

struct NativeModule {
    exports: *const ExportTable,
    /// Keep the library loaded
    _library: Library,
}

// SAFETY: the export table is an immutable `static` inside the library, and
// the library is kept alive for as long as the pointer is reachable.
unsafe impl Send for NativeModule {}
unsafe impl Sync for NativeModule {}

impl CodeModule for NativeModule {
    fn exports(&self) -> &ExportTable {
        // SAFETY: checked non-null at load time; points into `_library`.
        unsafe { &*self.exports }
    }
}

impl ModuleLoader for NativeLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn CodeModule>, ModLoaderError> {
        // SAFETY: We're loading a mod the user installed into the mods directory.
        // The module is expected to follow the export_mod! contract.
        let library = unsafe { Library::new(path)? };

        let found = {
            // SAFETY: We're calling a C function exported by the module.
            let api_version_fn: Symbol<extern "C" fn() -> u32> =
                unsafe { library.get(API_VERSION_SYMBOL) }
                    .map_err(|_| missing_export(path, API_VERSION_SYMBOL))?;
            api_version_fn()
        };
        if found != API_VERSION {
            return Err(ModLoaderError::ApiVersionMismatch {
                expected: API_VERSION,
                found,
            });
        }

        let exports = {
            // SAFETY: The returned pointer refers to a static in the library.
            let exports_fn: Symbol<extern "C" fn() -> *const ExportTable> =
                unsafe { library.get(EXPORTS_SYMBOL) }
                    .map_err(|_| missing_export(path, EXPORTS_SYMBOL))?;
            exports_fn()
        };
        if exports.is_null() {
            return Err(missing_export(path, EXPORTS_SYMBOL));
        }

        Ok(Box::new(NativeModule {
            exports,
            _library: library,
        }))
    }
}

fn missing_export(path: &Path, symbol: &[u8]) -> ModLoaderError {
    ModLoaderError::MissingExport {
        path: path.to_path_buf(),
        symbol: String::from_utf8_lossy(symbol).into_owned(),
    }
}

struct StaticModule(&'static ExportTable);

impl CodeModule for StaticModule {
    fn exports(&self) -> &ExportTable {
        self.0
    }
}

/// Serves export tables linked into the host, keyed by module file name.
///
/// The module file must still exist in the package directory; only the
/// loading step is replaced.
#[derive(Debug, Default, Clone)]
pub struct StaticLoader {
    modules: HashMap<String, &'static ExportTable>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: serve `exports` for module files named `file_name`
    pub fn with_module(mut self, file_name: impl Into<String>, exports: &'static ExportTable) -> Self {
        self.register(file_name, exports);
        self
    }

    pub fn register(&mut self, file_name: impl Into<String>, exports: &'static ExportTable) {
        self.modules.insert(file_name.into(), exports);
    }
}

impl ModuleLoader for StaticLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn CodeModule>, ModLoaderError> {
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| self.modules.get(name))
            .map(|exports| Box::new(StaticModule(*exports)) as Box<dyn CodeModule>)
            .ok_or_else(|| ModLoaderError::ModuleNotRegistered {
                path: PathBuf::from(path),
            })
    }
}
