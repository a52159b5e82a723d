//! Generator settings file. Loaded from `starsys.ron` (or `--config`) at startup.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use procgen::SystemSettings;

/// Default file name looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "starsys.ron";

/// Load settings from `path`, or from `starsys.ron` in the current directory.
/// A missing or invalid file falls back to the built-in defaults.
pub fn load(path: Option<&Path>) -> SystemSettings {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_path);
    match std::fs::read_to_string(&path) {
        Ok(data) => match parse(&data) {
            Ok(settings) => {
                log::info!("Loaded settings from {:?}", path);
                return settings;
            }
            Err(e) => log::warn!("Invalid settings at {:?}: {}, using defaults", path, e),
        },
        Err(_) => log::debug!("No settings file at {:?}, using defaults", path),
    }
    SystemSettings::default()
}

/// Parse a RON settings document. Fields left out take their defaults.
pub fn parse(data: &str) -> Result<SystemSettings> {
    Ok(ron::from_str(data)?)
}

/// Write `settings` as pretty RON.
pub fn save(settings: &SystemSettings, path: &Path) -> Result<()> {
    let text = ron::ser::to_string_pretty(settings, ron::ser::PrettyConfig::default())?;
    std::fs::write(path, text).with_context(|| format!("could not write settings to {:?}", path))
}

fn default_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(DEFAULT_CONFIG_FILE)
}
