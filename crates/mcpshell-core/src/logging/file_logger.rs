//! File-based logger
//!
//! The tool servers keep a log file next to where they were started
//! (`mcp_bash_server.log` by default) in addition to their console output.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::traits::Logger;

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARNING"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl LogLevel {
    /// Parse a level name, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "debug" | "trace" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Logger appending `timestamp - name - LEVEL - message` lines to a file
pub struct FileLogger {
    path: PathBuf,
    name: String,
    min_level: LogLevel,
    file: Mutex<File>,
}

impl FileLogger {
    /// Open (or create) the log file in append mode
    pub fn open(path: impl AsRef<Path>, name: impl Into<String>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            name: name.into(),
            min_level: LogLevel::Info,
            file: Mutex::new(file),
        })
    }

    /// Set the minimum level written to the file
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, level: LogLevel, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
        let mut file = self.file.lock();
        // A failed log write must never take the server down
        let _ = writeln!(file, "{} - {} - {} - {}", timestamp, self.name, level, message);
        let _ = file.flush();
    }
}

impl std::fmt::Debug for FileLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLogger")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("min_level", &self.min_level)
            .finish()
    }
}

impl Logger for FileLogger {
    fn debug(&self, message: &str) {
        self.write(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.write(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.write(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.write(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_log_levels() {
        assert!(LogLevel::Info > LogLevel::Debug);
        assert!(LogLevel::Warn > LogLevel::Info);
        assert!(LogLevel::Error > LogLevel::Warn);
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("verbose"), None);
    }

    #[test]
    fn test_writes_lines_at_or_above_min_level() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("server.log");
        let logger = FileLogger::open(&path, "mcp_bash_server").unwrap();

        logger.debug("hidden");
        logger.info("Initial working directory: /tmp");
        logger.warn("stderr: boom");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("hidden"));
        assert!(content.contains("mcp_bash_server - INFO - Initial working directory: /tmp"));
        assert!(content.contains("WARNING - stderr: boom"));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("server.log");
        std::fs::write(&path, "previous line\n").unwrap();

        let logger = FileLogger::open(&path, "test").unwrap().with_min_level(LogLevel::Debug);
        logger.debug("next line");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("previous line\n"));
        assert!(content.contains("DEBUG - next line"));
    }
}
