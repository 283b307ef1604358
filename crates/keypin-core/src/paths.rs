//! Path resolution utilities.

use crate::env;
use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the keypin base directory (`$KEYPIN_HOME`, else ~/.keypin).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = env::get_var(env::vars::KEYPIN_HOME) {
        return Ok(expand_tilde(&home));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".keypin"))
}

/// Get the main config file path (`$KEYPIN_CONFIG`, else ~/.keypin/keypin.json5).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    if let Some(path) = env::get_var(env::vars::KEYPIN_CONFIG) {
        return Ok(expand_tilde(&path));
    }
    Ok(base_dir()?.join("keypin.json5"))
}

/// Get the encrypted credential cache directory (~/.keypin/cache).
pub fn cache_dir() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("cache"))
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
