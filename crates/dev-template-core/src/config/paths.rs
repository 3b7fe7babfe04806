//! Platform-aware locations for configuration and logs
//!
//! # Environment Variables
//!
//! - `DEV_TEMPLATE_CONFIG_DIR` - Override the config directory
//! - `DEV_TEMPLATE_LOG_DIR` - Override the debug log directory

use crate::error::ConfigError;
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "DEV_TEMPLATE_CONFIG_DIR";

/// Environment variable for log directory override
pub const ENV_LOG_DIR: &str = "DEV_TEMPLATE_LOG_DIR";

const APP_DIR: &str = "dev-template";

/// Get the config directory path
///
/// Priority:
/// 1. `DEV_TEMPLATE_CONFIG_DIR` env var
/// 2. Platform config dir (`~/.config/dev-template`, `%APPDATA%\dev-template`, ...)
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = env_override(ENV_CONFIG_DIR) {
        log::debug!("Using config dir from {}: {}", ENV_CONFIG_DIR, dir.display());
        return Ok(dir);
    }

    let dir = dirs::config_dir()
        .ok_or(ConfigError::NoConfigDir)?
        .join(APP_DIR);
    Ok(dir)
}

/// Get the debug log directory path
///
/// Priority:
/// 1. `DEV_TEMPLATE_LOG_DIR` env var
/// 2. Platform local data dir + `dev-template/logs`
/// 3. `<config dir>/logs`
pub fn log_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = env_override(ENV_LOG_DIR) {
        return Ok(dir);
    }

    match dirs::data_local_dir() {
        Some(data) => Ok(data.join(APP_DIR).join("logs")),
        None => Ok(config_dir()?.join("logs")),
    }
}

/// Default place for new projects: the home directory, else the current one
pub fn default_project_dir() -> PathBuf {
    dirs::home_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("/"))
}

fn env_override(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
