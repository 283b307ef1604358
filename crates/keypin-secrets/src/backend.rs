//! The configured cache backend behind the core's cache port.

use async_trait::async_trait;
use keypin_core::config::{CacheBackend, CacheConfig};
use keypin_core::ports::PortResult;
use keypin_core::{Credential, CredentialCache};
use tracing::{debug, info};

use crate::error::{Result, SecretError};
use crate::file_cache::FileCredentialCache;
use crate::keychain_cache::KeychainCache;
use crate::types::{CachedEntry, DEFAULT_LABEL};

/// One of the supported credential stores.
pub enum Cache {
    File(FileCredentialCache),
    Keychain(KeychainCache),
    /// Stores nothing and finds nothing.
    Disabled,
}

impl Cache {
    /// Open the backend selected by `config`.
    pub fn open(config: &CacheConfig) -> Result<Self> {
        let cache = match config.backend {
            CacheBackend::File => Self::File(FileCredentialCache::open(config.dir.clone())?),
            CacheBackend::Keychain => Self::Keychain(KeychainCache::new(config.service.clone())),
            CacheBackend::None => Self::Disabled,
        };
        info!(backend = cache.name(), "credential cache ready");
        Ok(cache)
    }

    /// Short backend name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Keychain(_) => "keychain",
            Self::Disabled => "none",
        }
    }

    /// Metadata of every cached credential.
    pub async fn list(&self) -> Result<Vec<CachedEntry>> {
        match self {
            Self::File(cache) => cache.list().await,
            Self::Keychain(_) => Err(SecretError::Unsupported("listing entries")),
            Self::Disabled => Ok(Vec::new()),
        }
    }

    /// Delete the credential for `key`. Returns whether one existed.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        match self {
            Self::File(cache) => cache.remove(key).await,
            Self::Keychain(cache) => cache.remove(key).await,
            Self::Disabled => Ok(false),
        }
    }
}

#[async_trait]
impl CredentialCache for Cache {
    async fn lookup(&self, key: &str) -> PortResult<Option<Credential>> {
        let found = match self {
            Self::File(cache) => cache.get(key).await?,
            Self::Keychain(cache) => cache.get(key).await?,
            Self::Disabled => None,
        };
        Ok(found)
    }

    async fn store(
        &self,
        key: &str,
        credential: &Credential,
        label: Option<&str>,
    ) -> PortResult<()> {
        let key = key.trim();
        if key.is_empty() {
            debug!("not caching a credential without a key");
            return Ok(());
        }
        let label = label.unwrap_or(DEFAULT_LABEL);

        match self {
            Self::File(cache) => cache.put(key, credential, label).await?,
            Self::Keychain(cache) => cache.put(key, credential, label).await?,
            Self::Disabled => {}
        }
        Ok(())
    }
}
