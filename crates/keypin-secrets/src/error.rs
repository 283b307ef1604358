//! Error types for the credential cache adapters.

use keypin_core::CollaboratorError;
use thiserror::Error;

/// Errors that can occur while reading or writing cached credentials.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Credential not found: {0}")]
    NotFound(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Keychain error: {0}")]
    KeychainError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid cache key: {0}")]
    InvalidName(String),

    #[error("{0} is not supported by this cache backend")]
    Unsupported(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result alias for cache operations.
pub type Result<T> = std::result::Result<T, SecretError>;

impl From<SecretError> for CollaboratorError {
    fn from(err: SecretError) -> Self {
        CollaboratorError::Cache(err.to_string())
    }
}
