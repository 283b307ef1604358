//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main keypin configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Credential cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Biometric gate settings.
    #[serde(default)]
    pub biometrics: BiometricsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Credential cache section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Which store backs the cache.
    #[serde(default)]
    pub backend: CacheBackend,

    /// Directory for the file backend (default ~/.keypin/cache).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Keychain service name for the keychain backend.
    #[serde(default = "default_service")]
    pub service: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            dir: None,
            service: default_service(),
        }
    }
}

fn default_service() -> String {
    "GnuPG".to_string()
}

/// Cache backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Encrypted files under the cache directory.
    File,
    /// The macOS login keychain.
    Keychain,
    /// No external cache; every request prompts.
    None,
}

impl Default for CacheBackend {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            Self::Keychain
        } else {
            Self::File
        }
    }
}

/// Biometric gate section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiometricsConfig {
    /// How the user-presence check is answered.
    #[serde(default)]
    pub mode: BiometricsMode,

    /// Fixed reason shown by the check (default: the window title).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Biometric gate behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiometricsMode {
    /// No sensor available; cached credentials are never released silently.
    #[default]
    Unavailable,
    /// Possession of the cache is enough; the check always passes.
    Trusted,
}

/// Logging section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `KEYPIN_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file. Logs go to stderr when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
