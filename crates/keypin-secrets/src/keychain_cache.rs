//! Credential cache in the macOS login keychain.
//!
//! Entries are generic passwords with the configured service name and the
//! cache key as account, so they are shared with other helpers that use the
//! same layout.

use keypin_core::Credential;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{Result, SecretError};
use crate::keychain;

/// A generic password item ready to be written.
#[derive(Debug)]
pub struct KeychainItem {
    pub service: String,
    pub account: String,
    /// Display label shown by Keychain Access.
    pub label: String,
    pub data: Zeroizing<Vec<u8>>,
}

/// Keychain-backed cache.
pub struct KeychainCache {
    service: String,
}

impl KeychainCache {
    /// Use generic password items under `service`.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// The item that stores `credential` under `key` with display `label`.
    pub fn item(&self, key: &str, credential: &Credential, label: &str) -> KeychainItem {
        KeychainItem {
            service: self.service.clone(),
            account: key.to_string(),
            label: label.to_string(),
            data: Zeroizing::new(credential.expose().as_bytes().to_vec()),
        }
    }

    /// Store `credential` under `key`, replacing any previous item.
    pub async fn put(&self, key: &str, credential: &Credential, label: &str) -> Result<()> {
        let item = self.item(key, credential, label);
        debug!(service = %item.service, key = %item.account, label = %item.label, "writing keychain item");
        blocking(move || keychain::save_item(&item)).await
    }

    /// Read the credential stored under `key`.
    pub async fn get(&self, key: &str) -> Result<Option<Credential>> {
        let service = self.service.clone();
        let account = key.to_string();
        let Some(data) = blocking(move || keychain::find_password(&service, &account)).await? else {
            return Ok(None);
        };

        let value = String::from_utf8(data)
            .map_err(|e| SecretError::KeychainError(format!("keychain data is not valid UTF-8: {e}")))?;
        Ok(Some(Credential::new(value)))
    }

    /// Delete the item for `key`. Returns whether one existed.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        let service = self.service.clone();
        let account = key.to_string();
        blocking(move || keychain::delete_password(&service, &account)).await
    }
}

/// Keychain calls can block on an unlock dialog.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SecretError::KeychainError(format!("keychain task failed: {e}")))?
}
