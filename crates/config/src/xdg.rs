//! File locations for quire under the XDG base directories.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::defaults::DOCUMENTS_DIR;

const APP_NAME: &str = "quire";
const CONFIG_FILE: &str = "config.toml";

/// `$XDG_CONFIG_HOME/quire/config.toml`, or `~/.config/quire/config.toml`.
pub fn config_file() -> Result<PathBuf> {
    Ok(app_dir(dirs::config_dir(), "config")?.join(CONFIG_FILE))
}

/// Default document store: `$XDG_DATA_HOME/quire/documents`, or
/// `~/.local/share/quire/documents`.
pub fn documents_dir() -> Result<PathBuf> {
    Ok(app_dir(dirs::data_dir(), "data")?.join(DOCUMENTS_DIR))
}

fn app_dir(base: Option<PathBuf>, kind: &str) -> Result<PathBuf> {
    base.map(|p| p.join(APP_NAME))
        .with_context(|| format!("Failed to determine {} directory", kind))
}
