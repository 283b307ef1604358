//! Encrypted file-backed credential cache.
//!
//! Each credential is stored as an individual JSON file at
//! `{base_dir}/{key}.json`, encrypted with a key derived from the master key.
//! The directory is created with mode `0700` and files with `0600` on Unix.

use std::path::{Path, PathBuf};

use chrono::Utc;
use keypin_core::Credential;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::crypto::{self, Sealed};
use crate::error::{Result, SecretError};
use crate::types::{CachedEntry, StoredEntry};

/// Maximum allowed length for a cache key.
const MAX_KEY_LEN: usize = 128;

/// A directory of encrypted credentials.
pub struct FileCredentialCache {
    base_dir: PathBuf,
    master_key: Zeroizing<Vec<u8>>,
}

impl FileCredentialCache {
    /// Create a cache rooted at `base_dir` using the provided master key.
    pub fn new(base_dir: PathBuf, master_key: Zeroizing<Vec<u8>>) -> Self {
        Self {
            base_dir,
            master_key,
        }
    }

    /// Create a cache in `base_dir` (or `~/.keypin/cache`) with the master
    /// key from [`crate::keychain::get_or_create_master_key`].
    pub fn open(base_dir: Option<PathBuf>) -> Result<Self> {
        let base_dir = match base_dir {
            Some(dir) => dir,
            None => keypin_core::paths::cache_dir()
                .map_err(|e| SecretError::StorageError(e.to_string()))?,
        };
        let master_key = crate::keychain::get_or_create_master_key()?;
        Ok(Self::new(base_dir, master_key))
    }

    /// Directory holding the entries.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.base_dir).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            tokio::fs::set_permissions(&self.base_dir, perms).await?;
        }

        Ok(())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }

    async fn read_entry(&self, path: &Path) -> Result<Option<StoredEntry>> {
        match tokio::fs::read_to_string(path).await {
            Ok(data) => Ok(Some(serde_json::from_str(&data)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Encrypt and store `credential` under `key`, replacing any previous
    /// entry but keeping its creation time.
    pub async fn put(&self, key: &str, credential: &Credential, label: &str) -> Result<()> {
        validate_key(key)?;
        self.ensure_dir().await?;

        let path = self.entry_path(key);
        let created_at = match self.read_entry(&path).await {
            Ok(Some(previous)) => previous.created_at,
            _ => Utc::now(),
        };

        let sealed = crypto::seal(&self.master_key, credential.expose().as_bytes())?;
        let (encrypted_value, salt) = sealed.to_text();
        let stored = StoredEntry {
            encrypted_value,
            salt,
            label: label.to_string(),
            created_at,
            updated_at: Utc::now(),
            usage_count: 0,
        };

        debug!(key, path = %path.display(), "writing cache entry");
        write_entry_file(&path, &stored).await
    }

    /// Decrypt the credential stored under `key`, counting the use.
    pub async fn get(&self, key: &str) -> Result<Option<Credential>> {
        validate_key(key)?;

        let path = self.entry_path(key);
        let Some(mut stored) = self.read_entry(&path).await? else {
            return Ok(None);
        };

        let sealed = Sealed::from_text(&stored.encrypted_value, &stored.salt)?;
        let plaintext = crypto::open(&self.master_key, &sealed)?;
        let value = String::from_utf8(plaintext.to_vec())
            .map_err(|e| SecretError::DecryptionFailed(format!("invalid UTF-8: {e}")))?;

        stored.usage_count += 1;
        write_entry_file(&path, &stored).await?;

        debug!(key, usage_count = stored.usage_count, "read cache entry");
        Ok(Some(Credential::new(value)))
    }

    /// Metadata of every entry, sorted by key.
    pub async fn list(&self) -> Result<Vec<CachedEntry>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.base_dir).await?;

        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match self.read_entry(&path).await {
                Ok(Some(stored)) => entries.push(CachedEntry::from_stored(key.to_string(), &stored)),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), "skipping unreadable cache entry: {e}"),
            }
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    /// Delete the entry for `key`. Returns whether one existed.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        validate_key(key)?;

        let path = self.entry_path(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key, path = %path.display(), "deleted cache entry");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Validate that a cache key is safe to use as a file name.
///
/// Allowed: ASCII alphanumeric, underscore, hyphen. Max length 128.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(SecretError::InvalidName("key must not be empty".to_string()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(SecretError::InvalidName(format!(
            "key exceeds maximum length of {MAX_KEY_LEN} characters"
        )));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(SecretError::InvalidName(format!(
            "key contains invalid characters (allowed: alphanumeric, underscore, hyphen): {key}"
        )));
    }
    Ok(())
}

/// Write `stored` to `path` through a temporary file that is created with
/// owner-only permissions, then renamed into place.
async fn write_entry_file(path: &Path, stored: &StoredEntry) -> Result<()> {
    let json = serde_json::to_string_pretty(stored)?;
    let temp_path = path.with_extension("tmp");

    match tokio::fs::remove_file(&temp_path).await {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
        _ => {}
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(&temp_path).await?;
    file.write_all(json.as_bytes()).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}
