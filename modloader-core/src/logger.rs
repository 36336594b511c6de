//! Shared mod log
//!
//! One [`ModLog`] sink per manager. The manager and every entry write
//! through a [`ModLogger`] that prefixes lines with its source id:
//!
//! ```text
//! [Manager] Parsing mods.
//! [addon] [Error] Required mod 'core' disabled.
//! ```
//!
//! Each line goes to the log file, optionally to stdout, and is mirrored as a
//! `tracing` event under the `modloader` target.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use modloader_api::LogLevel;

/// Source id used by the manager itself.
pub const MANAGER_SOURCE: &str = "Manager";

/// Append-only sink shared by the manager and all entries.
#[derive(Debug)]
pub struct ModLog {
    path: Option<PathBuf>,
    echo_console: bool,
    write_lock: Mutex<()>,
}

impl ModLog {
    /// Create a sink writing to `path` and, if `echo_console`, to stdout.
    pub fn new(path: impl Into<PathBuf>, echo_console: bool) -> Self {
        Self {
            path: Some(path.into()),
            echo_console,
            write_lock: Mutex::new(()),
        }
    }

    /// Create a sink that only mirrors to `tracing`.
    pub fn detached() -> Self {
        Self {
            path: None,
            echo_console: false,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Format and write one line.
    pub fn write(&self, source: &str, level: LogLevel, message: &str) {
        let line = format_line(source, level, message);

        match level {
            LogLevel::Info => tracing::info!(target: "modloader", source, "{}", message),
            LogLevel::Warning => tracing::warn!(target: "modloader", source, "{}", message),
            LogLevel::Error | LogLevel::Critical => {
                tracing::error!(target: "modloader", source, severity = %level, "{}", message)
            }
        }

        if self.echo_console {
            println!("{line}");
        }

        if let Some(path) = &self.path {
            let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = append_line(path, &line) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to write mod log");
            }
        }
    }

    /// Truncate the log file, creating it if its directory exists.
    pub fn clear(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if !path.parent().is_some_and(Path::is_dir) {
            return;
        }

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = File::create(path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to clear mod log");
        }
    }
}

fn format_line(source: &str, level: LogLevel, message: &str) -> String {
    match level.tag() {
        Some(tag) => format!("[{source}] [{tag}] {message}"),
        None => format!("[{source}] {message}"),
    }
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}

/// A [`ModLog`] handle that prefixes every line with one source id.
#[derive(Debug, Clone)]
pub struct ModLogger {
    source: String,
    sink: Arc<ModLog>,
}

impl ModLogger {
    pub fn new(source: impl Into<String>, sink: Arc<ModLog>) -> Self {
        Self {
            source: source.into(),
            sink,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
        self.sink.write(&self.source, level, message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_line_prefixes() {
        assert_eq!(
            format_line("Manager", LogLevel::Info, "Parsing mods."),
            "[Manager] Parsing mods."
        );
        assert_eq!(
            format_line("core", LogLevel::Error, "boom"),
            "[core] [Error] boom"
        );
        assert_eq!(
            format_line("core", LogLevel::Critical, "boom"),
            "[core] [Critical] boom"
        );
    }

    #[test]
    fn test_loggers_share_one_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ModManager.log");
        let sink = Arc::new(ModLog::new(&path, false));

        ModLogger::new(MANAGER_SOURCE, sink.clone()).info("Initialize.");
        ModLogger::new("core", sink).warning("careful");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "[Manager] Initialize.\n[core] [Warning] careful\n");
    }

    #[test]
    fn test_clear_truncates_existing_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ModManager.log");
        let sink = Arc::new(ModLog::new(&path, false));
        let logger = ModLogger::new("core", sink.clone());

        logger.info("old line");
        sink.clear();
        logger.info("new line");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "[core] new line\n");
    }

    #[test]
    fn test_clear_without_directory_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing/ModManager.log");
        let sink = ModLog::new(&path, false);

        sink.clear();
        sink.write("core", LogLevel::Info, "dropped");

        assert!(!path.exists());
    }

    #[test]
    fn test_detached_log_has_no_path() {
        let sink = ModLog::detached();
        assert!(sink.path().is_none());
        sink.write("core", LogLevel::Error, "only traced");
    }
}
