//! Package discovery - find and parse `info.json` manifests under a mods root

use std::path::{Path, PathBuf};

use modloader_api::Manifest;

use crate::error::ModLoaderError;
use crate::logger::ModLogger;

/// A package directory with a valid, uniquely identified manifest.
#[derive(Debug, Clone)]
pub struct Package {
    pub dir: PathBuf,
    pub manifest: Manifest,
}

/// Result of scanning a mods root.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Package directories that had a manifest file, valid or not
    pub found: usize,
    pub packages: Vec<Package>,
}

/// Scan the immediate subdirectories of `mods_dir` for manifests.
///
/// Directories are visited in path order. Malformed manifests, empty ids and
/// duplicate ids are logged and skipped; the first package with an id wins.
pub fn discover(mods_dir: &Path, logger: &ModLogger) -> Discovery {
    let mut discovery = Discovery::default();

    let dirs = match package_dirs(mods_dir) {
        Ok(dirs) => dirs,
        Err(e) => {
            logger.error(format!("Error reading '{}'.", mods_dir.display()));
            logger.error(e.to_string());
            return discovery;
        }
    };

    for dir in dirs {
        let manifest_path = modloader_paths::manifest_file(&dir);
        if !manifest_path.is_file() {
            continue;
        }

        discovery.found += 1;
        logger.info(format!("Reading file '{}'.", manifest_path.display()));

        let mut manifest = match read_manifest(&manifest_path) {
            Ok(manifest) => manifest,
            Err(e) => {
                logger.error(format!(
                    "Error parsing file '{}'.",
                    manifest_path.display()
                ));
                logger.info(e.to_string());
                continue;
            }
        };

        if manifest.id.is_empty() {
            logger.error("Id is null.");
            continue;
        }
        if discovery
            .packages
            .iter()
            .any(|p| p.manifest.id == manifest.id)
        {
            logger.error(format!("Id '{}' already uses another mod.", manifest.id));
            continue;
        }
        if manifest.module_file().is_none() {
            manifest.module_name = Some(modloader_paths::module_file_name(&manifest.id));
        }

        discovery.packages.push(Package { dir, manifest });
    }

    discovery
}

/// Parse one `info.json`. The top-level value must be a JSON object.
pub fn read_manifest(path: &Path) -> Result<Manifest, ModLoaderError> {
    let content = std::fs::read_to_string(path)?;
    let manifest_error = |source| ModLoaderError::Manifest {
        path: path.to_path_buf(),
        source,
    };

    let value: serde_json::Value = serde_json::from_str(&content).map_err(manifest_error)?;
    if !value.is_object() {
        return Err(manifest_error(serde::de::Error::custom(
            "manifest must be a JSON object",
        )));
    }
    serde_json::from_value(value).map_err(manifest_error)
}

fn package_dirs(mods_dir: &Path) -> Result<Vec<PathBuf>, ModLoaderError> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(mods_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::ModLog;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn write_package(root: &Path, dir: &str, manifest: &str) {
        let package = root.join(dir);
        std::fs::create_dir_all(&package).unwrap();
        std::fs::write(package.join("info.json"), manifest).unwrap();
    }

    fn setup() -> (TempDir, ModLogger) {
        let dir = TempDir::new().unwrap();
        let log = Arc::new(ModLog::new(dir.path().join("ModManager.log"), false));
        (dir, ModLogger::new("Manager", log))
    }

    fn log_text(dir: &TempDir) -> String {
        std::fs::read_to_string(dir.path().join("ModManager.log")).unwrap_or_default()
    }

    #[test]
    fn test_discovers_valid_packages_in_path_order() {
        let (dir, logger) = setup();
        write_package(dir.path(), "b-pkg", r#"{"Id": "beta", "Version": "1.0.0"}"#);
        write_package(dir.path(), "a-pkg", r#"{"Id": "alpha", "Version": "1.0.0"}"#);

        let discovery = discover(dir.path(), &logger);

        assert_eq!(discovery.found, 2);
        let ids: Vec<_> = discovery
            .packages
            .iter()
            .map(|p| p.manifest.id.as_str())
            .collect();
        assert_eq!(ids, vec!["alpha", "beta"]);
        assert!(discovery.packages[0].dir.ends_with("a-pkg"));
    }

    #[test]
    fn test_default_module_name_from_id() {
        let (dir, logger) = setup();
        write_package(dir.path(), "core", r#"{"Id": "core"}"#);

        let discovery = discover(dir.path(), &logger);

        assert_eq!(
            discovery.packages[0].manifest.module_file(),
            Some(modloader_paths::module_file_name("core").as_str())
        );
    }

    #[test]
    fn test_directories_without_manifest_ignored() {
        let (dir, logger) = setup();
        std::fs::create_dir_all(dir.path().join("empty")).unwrap();
        std::fs::write(dir.path().join("stray.json"), "{}").unwrap();

        let discovery = discover(dir.path(), &logger);
        assert_eq!(discovery.found, 0);
        assert!(discovery.packages.is_empty());
    }

    #[test]
    fn test_invalid_manifests_counted_but_skipped() {
        let (dir, logger) = setup();
        write_package(dir.path(), "broken", "{ not json");
        write_package(dir.path(), "noid", r#"{"Version": "1.0.0"}"#);
        write_package(dir.path(), "nullid", r#"{"Id": null}"#);

        let discovery = discover(dir.path(), &logger);

        assert_eq!(discovery.found, 3);
        assert!(discovery.packages.is_empty());

        let log = log_text(&dir);
        assert!(log.contains("[Manager] [Error] Error parsing file"));
        assert_eq!(log.matches("[Manager] [Error] Id is null.").count(), 2);
    }

    #[test]
    fn test_duplicate_id_first_wins() {
        let (dir, logger) = setup();
        write_package(dir.path(), "one", r#"{"Id": "x", "Version": "1.0.0"}"#);
        write_package(dir.path(), "two", r#"{"Id": "x", "Version": "2.0.0"}"#);

        let discovery = discover(dir.path(), &logger);

        assert_eq!(discovery.found, 2);
        assert_eq!(discovery.packages.len(), 1);
        assert_eq!(discovery.packages[0].manifest.version, "1.0.0");
        assert!(log_text(&dir).contains("Id 'x' already uses another mod."));
    }

    #[test]
    fn test_read_manifest_error_has_path() {
        let (dir, _logger) = setup();
        write_package(dir.path(), "broken", "[]");

        let err = read_manifest(&dir.path().join("broken/info.json")).unwrap_err();
        assert!(matches!(err, ModLoaderError::Manifest { .. }));
        assert!(err.to_string().contains("info.json"));
        assert!(err.to_string().contains("JSON object"));
    }

    #[test]
    fn test_positional_array_manifest_rejected() {
        let (dir, logger) = setup();
        write_package(dir.path(), "positional", r#"["x", "X", "me", "1.0.0"]"#);
        write_package(dir.path(), "scalar", "\"x\"");

        let discovery = discover(dir.path(), &logger);

        assert_eq!(discovery.found, 2);
        assert!(discovery.packages.is_empty());
        assert_eq!(
            log_text(&dir)
                .matches("[Manager] [Error] Error parsing file")
                .count(),
            2
        );
    }
}
