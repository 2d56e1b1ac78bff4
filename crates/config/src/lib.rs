//! Configuration management for quire.
//!
//! This crate provides configuration loading, saving, and validation
//! with support for TOML format and XDG directory conventions.

mod settings;
mod xdg;

pub use settings::{AnalyticsSettings, AutosaveSettings, Config, LoggingSettings, SearchSettings};
pub use xdg::{config_file, documents_dir};

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default values as constants
pub mod defaults {
    pub const AUTOSAVE_ENABLED: bool = true;
    pub const AUTOSAVE_INTERVAL_MS: u64 = 30_000;
    pub const AUTOSAVE_DEBOUNCE_MS: u64 = 1000;
    pub const HISTORY_LIMIT: usize = 50;
    pub const READING_WPM: u32 = 225;
    pub const SPEAKING_WPM: u32 = 140;
    pub const MIN_LOG_LEVEL: &str = "info";
    pub const MAX_LOG_ENTRIES: usize = 1000;
    pub const DOCUMENTS_DIR: &str = "documents";
}

const LOG_LEVELS: [&str; 5] = ["debug", "info", "warn", "warning", "error"];

impl Config {
    /// Load configuration from the XDG config file.
    ///
    /// On first run, creates config file with default values.
    /// Auto-completes missing keys with default values.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load configuration from an explicit path, creating it with defaults
    /// when missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run - create config file with default values
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let original_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&original_content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;

        // Serialize back to get normalized content
        let normalized_content = toml::to_string_pretty(&config)?;

        // If content changed, save the updated config
        if original_content != normalized_content {
            config.save_to(path)?;
        }

        Ok(config)
    }

    /// Save configuration to the XDG config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Get path to config file.
    pub fn config_file_path() -> Result<PathBuf> {
        config_file()
    }

    /// Directory documents are stored in.
    pub fn storage_dir(&self) -> Result<PathBuf> {
        match &self.autosave.storage_dir {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => documents_dir(),
        }
    }

    /// Validate config content.
    pub fn validate_content(content: &str) -> Result<Config> {
        let config: Config = toml::from_str(content).map_err(|e| anyhow::anyhow!("{}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.autosave.interval_ms == 0 {
            bail!("autosave.interval_ms must be greater than 0");
        }
        if self.autosave.debounce_ms == 0 {
            bail!("autosave.debounce_ms must be greater than 0");
        }
        if self.autosave.history_limit == 0 {
            bail!("autosave.history_limit must be greater than 0");
        }
        if self.analytics.reading_wpm == 0 || self.analytics.speaking_wpm == 0 {
            bail!("analytics rates must be greater than 0");
        }
        let level = self.logging.min_level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            bail!("Unknown log level: {}", self.logging.min_level);
        }
        Ok(())
    }
}
