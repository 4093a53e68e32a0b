//! Configuration loading.
//!
//! Resolves the config path, creates a default file on first run, parses the
//! TOML and validates the result.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::Config;
use super::builder::create_default_config;
use super::validation::validate_config;
use crate::common::constants::*;

/// Configuration directory override, set once at startup from `--config`.
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Set the configuration directory for this process. Can only be set once.
pub fn set_config_dir(dir: Option<String>) -> Result<()> {
    CONFIG_DIR
        .set(dir.map(PathBuf::from))
        .map_err(|_| anyhow::anyhow!("Configuration directory already set"))
}

/// The `--config` directory, if one was given.
pub fn get_custom_config_dir() -> Option<PathBuf> {
    CONFIG_DIR.get().and_then(|d| d.clone())
}

/// Path of `suntrack.toml`.
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(custom_dir) = get_custom_config_dir() {
        return Ok(custom_dir.join(CONFIG_FILE_NAME));
    }
    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration using automatic path detection.
///
/// A default configuration file is written if none exists.
pub fn load() -> Result<Config> {
    let config_path = get_config_path()?;
    load_or_create(&config_path)
}

/// Load `path`, writing the default configuration there first if it is missing.
pub fn load_or_create(path: &Path) -> Result<Config> {
    if !path.exists() {
        create_default_config(path).context("Failed to create default config during load")?;
        log_indented!("Created default configuration at {}", path.display());
    }
    load_from_path(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Load configuration from a specific path. Never creates the file.
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Configuration file not found: {}", path.display());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))?;

    validate_config(&config)?;

    Ok(config)
}
