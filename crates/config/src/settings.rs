//! Configuration structures for quire settings.

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Application configuration with nested sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Autosave and version history
    #[serde(default)]
    pub autosave: AutosaveSettings,

    /// Default search options
    #[serde(default)]
    pub search: SearchSettings,

    /// Reading and speaking rates
    #[serde(default)]
    pub analytics: AnalyticsSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Autosave settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutosaveSettings {
    /// Save automatically while editing
    #[serde(default = "default_autosave_enabled")]
    pub enabled: bool,

    /// Periodic save interval in ms
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Quiet window after the last edit in ms
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Version records kept across all documents
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Document storage directory (defaults to the data directory)
    #[serde(default)]
    pub storage_dir: Option<String>,
}

/// Default search options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default)]
    pub case_sensitive: bool,

    /// Match whole words only (literal queries)
    #[serde(default)]
    pub whole_word: bool,

    /// Treat queries as regular expressions
    #[serde(default)]
    pub regex: bool,
}

/// Analytics settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsSettings {
    /// Words per minute for reading time
    #[serde(default = "default_reading_wpm")]
    pub reading_wpm: u32,

    /// Words per minute for speaking time
    #[serde(default = "default_speaking_wpm")]
    pub speaking_wpm: u32,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log file path (optional)
    #[serde(default)]
    pub file_path: Option<String>,

    /// Minimum log level (debug, info, warn, error)
    #[serde(default = "default_min_level")]
    pub min_level: String,

    /// Log entries kept in memory
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

// Default value functions for serde
fn default_autosave_enabled() -> bool {
    defaults::AUTOSAVE_ENABLED
}

fn default_interval_ms() -> u64 {
    defaults::AUTOSAVE_INTERVAL_MS
}

fn default_debounce_ms() -> u64 {
    defaults::AUTOSAVE_DEBOUNCE_MS
}

fn default_history_limit() -> usize {
    defaults::HISTORY_LIMIT
}

fn default_reading_wpm() -> u32 {
    defaults::READING_WPM
}

fn default_speaking_wpm() -> u32 {
    defaults::SPEAKING_WPM
}

fn default_min_level() -> String {
    defaults::MIN_LOG_LEVEL.to_string()
}

fn default_max_entries() -> usize {
    defaults::MAX_LOG_ENTRIES
}

// Default implementations
impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            enabled: default_autosave_enabled(),
            interval_ms: default_interval_ms(),
            debounce_ms: default_debounce_ms(),
            history_limit: default_history_limit(),
            storage_dir: None,
        }
    }
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            reading_wpm: default_reading_wpm(),
            speaking_wpm: default_speaking_wpm(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file_path: None,
            min_level: default_min_level(),
            max_entries: default_max_entries(),
        }
    }
}
