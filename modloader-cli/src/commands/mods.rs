//! Mod management commands

use std::path::Path;

use anyhow::Result;
use modloader_api::Manifest;
use modloader_core::{EntryStatus, MANAGER_VERSION, ManagerConfig, ModEntry, ModManager};

fn manager(mods_dir: &Path) -> ModManager {
    ModManager::new(ManagerConfig {
        mods_dir: mods_dir.to_path_buf(),
        host_version: MANAGER_VERSION.to_string(),
        echo_console: false,
    })
}

fn status_marker(entry: &ModEntry) -> &'static str {
    match entry.status() {
        EntryStatus::Loaded if entry.is_active() => "✓",
        EntryStatus::Loaded => "○",
        EntryStatus::Pending if entry.is_enabled() => "·",
        EntryStatus::Pending => "○",
        EntryStatus::Failed | EntryStatus::Declined => "✗",
    }
}

fn status_label(entry: &ModEntry) -> &'static str {
    match entry.status() {
        EntryStatus::Loaded if entry.is_active() => "Active",
        EntryStatus::Loaded => "Inactive",
        EntryStatus::Pending => "Not loaded",
        EntryStatus::Failed => "Failed",
        EntryStatus::Declined => "Declined",
    }
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() { "Unknown" } else { value }
}

fn print_entry(entry: &ModEntry) {
    let enabled = if entry.is_enabled() { "enabled" } else { "disabled" };
    print!(
        "{} {} v{} ({})",
        status_marker(entry),
        entry.id(),
        entry.version(),
        enabled
    );
    if !entry.requirements().is_empty() {
        let requirements: Vec<String> = entry
            .requirements()
            .iter()
            .map(|r| match r.min_version {
                Some(min) => format!("{}>={}", r.id, min),
                None => r.id.clone(),
            })
            .collect();
        print!("    requires {}", requirements.join(", "));
    }
    println!();
}

/// List discovered mods in load order
pub fn list(mods_dir: &Path) -> Result<()> {
    let mut manager = manager(mods_dir);
    let found = manager.scan();

    if manager.entries().is_empty() {
        println!("No mods installed");
        println!();
        println!("Mods directory: {}", mods_dir.display());
        println!();
        println!("To install a mod:");
        println!("  1. Create a package directory: mkdir -p <mods>/my-mod");
        println!("  2. Add an info.json manifest with Id, Version and EntryMethod");
        println!("  3. Copy the mod library next to it");
        return Ok(());
    }

    for entry in manager.entries() {
        print_entry(entry);
    }
    if found > manager.entries().len() {
        println!();
        println!(
            "{} package(s) skipped, see {}",
            found - manager.entries().len(),
            modloader_paths::log_file(mods_dir).display()
        );
    }

    Ok(())
}

/// Show one mod's manifest
pub fn info(mods_dir: &Path, id: &str) -> Result<()> {
    let mut manager = manager(mods_dir);
    manager.scan();

    let Some(entry) = manager.find_by_id(id) else {
        println!("Mod '{}' not found", id);
        println!();
        println!("Run 'modloader list' to see all mods.");
        return Ok(());
    };

    print_manifest(entry.manifest());
    println!("Path:         {}", entry.path().display());
    println!(
        "Enabled:      {}",
        if entry.is_enabled() { "yes" } else { "no" }
    );
    if !entry.requirements().is_empty() {
        println!();
        println!("Requirements:");
        for requirement in entry.requirements() {
            match requirement.min_version {
                Some(min) => println!("  {} (>= {})", requirement.id, min),
                None => println!("  {}", requirement.id),
            }
        }
    }

    Ok(())
}

fn print_manifest(m: &Manifest) {
    println!("Id:           {}", m.id);
    println!("Name:         {}", m.name());
    println!("Version:      {}", or_unknown(&m.version));
    println!("Author:       {}", or_unknown(&m.author));
    if let Some(version) = m.required_manager_version() {
        println!("Manager:      >= {}", version);
    }
    println!("Module:       {}", m.module_file().unwrap_or("-"));
    println!("Entry method: {}", m.entry_point().unwrap_or("-"));
    if let Some(home) = m.home_page.as_deref().filter(|s| !s.is_empty()) {
        println!("Home page:    {}", home);
    }
    if let Some(repo) = m.repository.as_deref().filter(|s| !s.is_empty()) {
        println!("Repository:   {}", repo);
    }
}

/// Persist a mod's enabled flag
pub fn set_enabled(mods_dir: &Path, id: &str, enabled: bool) -> Result<()> {
    let mut manager = manager(mods_dir);
    manager.scan();
    manager.set_enabled(id, enabled)?;
    manager.save_settings()?;

    if enabled {
        println!("Enabled mod: {}", id);
    } else {
        println!("Disabled mod: {}", id);
    }
    Ok(())
}

/// Load every mod and print the outcome
pub fn start(mods_dir: &Path) -> Result<()> {
    let mut manager = manager(mods_dir);
    let Some(report) = manager.start() else {
        return Ok(());
    };

    for entry in manager.entries() {
        println!(
            "{} {} v{}    {}",
            status_marker(entry),
            entry.id(),
            entry.version(),
            status_label(entry)
        );
    }
    println!();
    println!(
        "Found {} mods, {} loaded, {} active",
        report.found, report.loaded, report.active
    );
    if let Some(log) = manager.log_path() {
        println!("Log: {}", log.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modloader_core::Settings;
    use tempfile::TempDir;

    fn write_package(root: &Path, id: &str, manifest: &str) {
        let package = root.join(id);
        std::fs::create_dir_all(&package).unwrap();
        std::fs::write(package.join("info.json"), manifest).unwrap();
    }

    #[test]
    fn test_enable_disable_roundtrip() {
        let dir = TempDir::new().unwrap();
        write_package(dir.path(), "core", r#"{"Id": "core", "Version": "1.0.0"}"#);
        let settings_path = modloader_paths::settings_file(dir.path());

        set_enabled(dir.path(), "core", false).unwrap();
        let settings = Settings::load(&settings_path).unwrap();
        assert_eq!(settings.is_enabled("core"), Some(false));

        set_enabled(dir.path(), "core", true).unwrap();
        let settings = Settings::load(&settings_path).unwrap();
        assert_eq!(settings.is_enabled("core"), Some(true));
    }

    #[test]
    fn test_enable_unknown_mod_fails() {
        let dir = TempDir::new().unwrap();
        let result = set_enabled(dir.path(), "ghost", true);
        assert!(result.is_err());
        assert!(!modloader_paths::settings_file(dir.path()).exists());
    }

    #[test]
    fn test_list_and_info_do_not_load() {
        let dir = TempDir::new().unwrap();
        write_package(
            dir.path(),
            "addon",
            r#"{"Id": "addon", "Version": "1.0.0", "Requirements": ["core-1.0.0"]}"#,
        );

        list(dir.path()).unwrap();
        info(dir.path(), "addon").unwrap();
        info(dir.path(), "missing").unwrap();
    }

    #[test]
    fn test_start_on_empty_dir() {
        let dir = TempDir::new().unwrap();
        let mods = dir.path().join("Mods");

        start(&mods).unwrap();
        assert!(mods.is_dir());
    }

    #[test]
    fn test_status_labels() {
        let dir = TempDir::new().unwrap();
        write_package(dir.path(), "core", r#"{"Id": "core", "Version": "1.0.0"}"#);
        let mut manager = manager(dir.path());
        manager.scan();

        let entry = manager.find_by_id("core").unwrap();
        assert_eq!(status_label(entry), "Not loaded");
        assert_eq!(status_marker(entry), "·");
    }
}
