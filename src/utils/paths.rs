//! Cross-Platform Path Utilities
//!
//! Resolves where the client looks for its configuration file.

use std::path::PathBuf;

use crate::utils::error::{AppError, AppResult};

/// Directory name under the platform config directory.
pub const APP_DIR_NAME: &str = "robot-teleop";

/// Get the platform configuration directory
pub fn user_config_dir() -> AppResult<PathBuf> {
    dirs::config_dir().ok_or_else(|| AppError::config("Could not determine config directory"))
}

/// Get the default config file path (<config dir>/robot-teleop/config.json)
pub fn default_config_path() -> AppResult<PathBuf> {
    Ok(user_config_dir()?.join(APP_DIR_NAME).join("config.json"))
}
