//! Centralized configuration paths for styledtext
//!
//! All config files live under:
//! - Unix/macOS: `~/.config/styledtext/`
//! - Windows: `%APPDATA%\styledtext\`

use std::{
    env, fs,
    path::{Path, PathBuf},
};

const APP_DIR: &str = "styledtext";
const LOGS_DIR: &str = "logs";

/// Base name of the rolling log file
pub const LOG_FILE_PREFIX: &str = "stx.log";

/// Base config directory
///
/// Unix/macOS:
///   - If XDG_CONFIG_HOME is set: `$XDG_CONFIG_HOME/styledtext`
///   - Else: `~/.config/styledtext`
///
/// Windows:
///   - `%APPDATA%\styledtext`
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

/// `~/.config/styledtext/config.yaml`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

/// `~/.config/styledtext/keymap.yaml`
pub fn keymap_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("keymap.yaml"))
}

/// `~/.config/styledtext/logs/`, where [`crate::tracing::init`] rolls
/// `stx.log.YYYY-MM-DD` files
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(LOGS_DIR))
}

fn ensure_dir(path: &Path) -> Result<(), String> {
    fs::create_dir_all(path)
        .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))
}

/// Ensure the base config dir exists, returning it
pub fn ensure_config_dir() -> Result<PathBuf, String> {
    let dir = config_dir().ok_or_else(|| "No config directory available".to_string())?;
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Ensure logs dir exists, returning it
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let config = ensure_config_dir()?;
    let logs = config.join(LOGS_DIR);
    ensure_dir(&logs)?;
    Ok(logs)
}
