//! Logging infrastructure for quire.
//!
//! A process-wide logger keeping the last N entries in memory (for status
//! displays and tests) and optionally appending them to a log file.
//! Messages logged before [`init`] are dropped, so library code can log
//! unconditionally.

use chrono::Local;
use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::Write as IoWrite;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

/// Log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Timestamp in HH:MM:SS.mmm format
    pub timestamp: String,
    /// Message level
    pub level: LogLevel,
    /// Component that logged the message
    pub target: &'static str,
    /// Message text
    pub message: String,
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert log level to string
    pub fn to_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Unknown log level: {}", s)),
        }
    }
}

#[derive(Debug)]
struct Logger {
    /// Most recent entries, oldest first
    entries: VecDeque<LogEntry>,
    max_entries: usize,
    min_level: LogLevel,
    /// Optional log file
    file_path: Option<PathBuf>,
}

impl Logger {
    fn new(file_path: Option<PathBuf>, max_entries: usize, min_level: LogLevel) -> Self {
        if let Some(path) = &file_path {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Ok(mut file) = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
            {
                let _ = writeln!(file, "=== quire log start ===");
            }
        }

        Self {
            entries: VecDeque::new(),
            max_entries,
            min_level,
            file_path,
        }
    }

    fn add_entry(&mut self, level: LogLevel, target: &'static str, message: String) {
        if level < self.min_level {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now().format("%H:%M:%S%.3f").to_string(),
            level,
            target,
            message,
        };

        if let Some(path) = &self.file_path {
            // Reopened per entry so a deleted log file gets recreated
            if let Ok(mut file) = OpenOptions::new().append(true).create(true).open(path) {
                let _ = writeln!(
                    file,
                    "[{}] {} {}: {}",
                    entry.timestamp,
                    entry.level.to_str(),
                    entry.target,
                    entry.message
                );
            }
        }

        self.entries.push_back(entry);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }
}

static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

fn with_logger(f: impl FnOnce(&mut Logger)) {
    if let Some(logger) = LOGGER.get() {
        if let Ok(mut logger) = logger.lock() {
            f(&mut logger);
        }
    }
}

/// Initialize the global logger
///
/// Subsequent calls are ignored.
///
/// # Arguments
///
/// * `file_path` - Log file to append to, if any
/// * `max_entries` - Maximum number of log entries to keep in memory
/// * `min_level` - Minimum log level to record
pub fn init(file_path: Option<PathBuf>, max_entries: usize, min_level: LogLevel) {
    LOGGER.get_or_init(|| Mutex::new(Logger::new(file_path, max_entries, min_level)));
}

/// Log a message at the given level.
pub fn log(level: LogLevel, target: &'static str, message: impl Into<String>) {
    with_logger(|logger| logger.add_entry(level, target, message.into()));
}

/// Log a debug message
pub fn debug(target: &'static str, message: impl Into<String>) {
    log(LogLevel::Debug, target, message);
}

/// Log an informational message
pub fn info(target: &'static str, message: impl Into<String>) {
    log(LogLevel::Info, target, message);
}

/// Log a warning message
pub fn warn(target: &'static str, message: impl Into<String>) {
    log(LogLevel::Warn, target, message);
}

/// Log an error message
pub fn error(target: &'static str, message: impl Into<String>) {
    log(LogLevel::Error, target, message);
}

/// Entries currently held in memory, oldest first.
pub fn get_entries() -> Vec<LogEntry> {
    let mut entries = Vec::new();
    with_logger(|logger| entries = logger.entries.iter().cloned().collect());
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
        assert!(LogLevel::Debug < LogLevel::Error);
    }

    #[test]
    fn test_level_filter_and_capacity() {
        let mut logger = Logger::new(None, 2, LogLevel::Info);
        logger.add_entry(LogLevel::Debug, "test", "dropped".to_string());
        logger.add_entry(LogLevel::Info, "test", "one".to_string());
        logger.add_entry(LogLevel::Warn, "test", "two".to_string());
        logger.add_entry(LogLevel::Error, "test", "three".to_string());

        let messages: Vec<&str> = logger.entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn test_global_logger() {
        init(None, 10, LogLevel::Info);
        debug("test", "below level");
        error("test", "disk full");

        let entries = get_entries();
        let last = entries.last().unwrap();
        assert_eq!(last.level, LogLevel::Error);
        assert_eq!(last.message, "disk full");
        assert!(entries.iter().all(|e| e.message != "below level"));
    }

    #[test]
    fn test_file_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("quire.log");

        let mut logger = Logger::new(Some(path.clone()), 10, LogLevel::Debug);
        logger.add_entry(LogLevel::Warn, "autosave", "save failed".to_string());

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("=== quire log start ==="));
        assert!(content.contains("WARN autosave: save failed"));
    }
}
