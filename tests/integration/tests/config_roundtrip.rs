//! Config save/load roundtrip integration tests.

use keypin_core::config::{BiometricsMode, CacheBackend, Config};
use keypin_core::ConfigError;
use keypin_secrets::Cache;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keypin.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("keypin.json5");

    let mut config = Config::default();
    config.cache.backend = CacheBackend::None;
    config.biometrics.mode = BiometricsMode::Trusted;
    config.biometrics.reason = Some("Release the passphrase".to_string());
    config.logging.level = "debug".to_string();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.cache.backend, CacheBackend::None);
    assert_eq!(loaded.biometrics.mode, BiometricsMode::Trusted);
    assert_eq!(loaded.biometrics.reason.as_deref(), Some("Release the passphrase"));
    assert_eq!(loaded.logging.level, "debug");
}

#[test]
fn test_hand_written_json5() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keypin.json5");
    let cache_dir = dir.path().join("creds");
    std::fs::write(
        &path,
        format!(
            "{{\n  // cache next to the config\n  cache: {{ backend: 'file', dir: '{}' }},\n}}\n",
            cache_dir.display()
        ),
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    config.validate().unwrap();
    assert_eq!(config.cache.backend, CacheBackend::File);
    assert_eq!(config.cache.dir, Some(PathBuf::from(&cache_dir)));
    assert_eq!(config.biometrics.mode, BiometricsMode::Unavailable);
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json5");

    assert!(matches!(Config::load(&path), Err(ConfigError::NotFound(_))));
    assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());
}

#[test]
fn test_disabled_backend_opens() {
    let mut config = Config::default();
    config.cache.backend = CacheBackend::None;

    let cache = Cache::open(&config.cache).unwrap();
    assert_eq!(cache.name(), "none");
}
