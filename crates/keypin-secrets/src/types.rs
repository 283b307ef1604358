//! Cache entry representations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label stored when the agent's description yielded none.
pub const DEFAULT_LABEL: &str = "GnuPG";

/// An encrypted credential as stored on disk.
///
/// `encrypted_value` holds the AES-256-GCM ciphertext (base64) and `salt`
/// the HKDF salt its key was derived with (hex).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntry {
    pub encrypted_value: String,
    pub salt: String,

    /// Human-readable name of the key this credential unlocks.
    #[serde(default = "default_label")]
    pub label: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Number of times the credential was released from the cache.
    #[serde(default)]
    pub usage_count: u64,
}

fn default_label() -> String {
    DEFAULT_LABEL.to_string()
}

/// Metadata of a cached credential. Never carries plaintext or ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedEntry {
    /// The cache key (keygrip).
    pub key: String,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub usage_count: u64,
}

impl CachedEntry {
    pub(crate) fn from_stored(key: String, stored: &StoredEntry) -> Self {
        Self {
            key,
            label: stored.label.clone(),
            created_at: stored.created_at,
            updated_at: stored.updated_at,
            usage_count: stored.usage_count,
        }
    }
}
