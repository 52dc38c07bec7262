//! Path resolution for groupctl
//!
//! # Environment Variables
//!
//! - `GROUPCTL_CONFIG_DIR` - Override config directory
//! - `GROUPCTL_STATE_DIR` - Override state directory
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `GROUPCTL_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/groupctl` (if set)
//! 3. Platform default:
//!    - Windows: `%APPDATA%\groupctl`
//!    - macOS/Linux: `~/.config/groupctl`
//!
//! For state_dir():
//! 1. `GROUPCTL_STATE_DIR` environment variable
//! 2. `XDG_STATE_HOME/groupctl` (if set)
//! 3. Platform default:
//!    - Windows: `%LOCALAPPDATA%\groupctl`
//!    - macOS/Linux: `~/.local/state/groupctl`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "GROUPCTL_CONFIG_DIR";

/// Environment variable for state directory override
pub const ENV_STATE_DIR: &str = "GROUPCTL_STATE_DIR";

const APP_DIR: &str = "groupctl";

/// Default config file name inside [`config_dir`]
pub const CONFIG_FILE: &str = "groups.toml";

/// Default state file name inside [`state_dir`]
pub const STATE_FILE: &str = "state.toml";

/// Get the groupctl config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join(APP_DIR);
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            return Ok(app_data.join(APP_DIR));
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join(APP_DIR);
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Get the groupctl state directory path
pub fn state_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_STATE_DIR) {
        let path = expand(&dir);
        log::debug!("Using state dir from {}: {}", ENV_STATE_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        let path = PathBuf::from(xdg_state).join(APP_DIR);
        log::debug!("Using XDG_STATE_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(local_app_data) = dirs::data_local_dir() {
            return Ok(local_app_data.join(APP_DIR));
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".local").join("state").join(APP_DIR);
    log::debug!("Using default state dir: {}", path.display());
    Ok(path)
}

/// Resolve the config file: explicit path, else `<config_dir>/groups.toml`
pub fn config_file(explicit: Option<&str>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(expand(path)),
        None => Ok(config_dir()?.join(CONFIG_FILE)),
    }
}

/// Resolve the state file: explicit path, else `<state_dir>/state.toml`
pub fn state_file(explicit: Option<&str>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(expand(path)),
        None => Ok(state_dir()?.join(STATE_FILE)),
    }
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}
