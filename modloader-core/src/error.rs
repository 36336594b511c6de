//! Mod loader error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the fallible steps of discovery, loading and persistence.
///
/// None of these escape [`crate::ModManager::start`] or
/// [`crate::ModEntry::load`]; they are logged there and turned into state.
#[derive(Error, Debug)]
pub enum ModLoaderError {
    /// Failed to load dynamic library
    #[error("Failed to load mod library: {0}")]
    LibraryLoad(#[from] libloading::Error),

    /// API version mismatch between the loader and a module
    #[error("API version mismatch: modloader expects {expected}, module has {found}")]
    ApiVersionMismatch { expected: u32, found: u32 },

    /// Module does not export a required symbol
    #[error("Module {path} does not export '{symbol}'")]
    MissingExport { path: PathBuf, symbol: String },

    /// No statically linked module registered under this file name
    #[error("No module registered for {path}")]
    ModuleNotRegistered { path: PathBuf },

    /// Manifest could not be parsed
    #[error("Invalid manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Settings error (parsing, saving, etc.)
    #[error("Settings error: {0}")]
    Settings(String),

    /// Mod not found
    #[error("Mod '{id}' not found")]
    NotFound { id: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_version_mismatch_display() {
        let err = ModLoaderError::ApiVersionMismatch {
            expected: 1,
            found: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("expects 1"));
        assert!(msg.contains("has 2"));
    }

    #[test]
    fn test_missing_export_display() {
        let err = ModLoaderError::MissingExport {
            path: PathBuf::from("/mods/core/core.so"),
            symbol: "_modloader_exports".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/mods/core/core.so"));
        assert!(msg.contains("_modloader_exports"));
    }

    #[test]
    fn test_not_found_display() {
        let err = ModLoaderError::NotFound {
            id: "addon".to_string(),
        };
        assert_eq!(err.to_string(), "Mod 'addon' not found");
    }

    #[test]
    fn test_manifest_error_keeps_source() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ModLoaderError::Manifest {
            path: PathBuf::from("info.json"),
            source,
        };
        assert!(err.to_string().starts_with("Invalid manifest info.json"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ModLoaderError = io_err.into();
        assert!(matches!(err, ModLoaderError::Io(_)));
    }
}
