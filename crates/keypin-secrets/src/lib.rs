//! Credential cache and biometric gate adapters for keypin.
//!
//! Implements the cache port of `keypin-core` with AES-256-GCM encrypted
//! files (master key from the environment or the OS keychain) or the macOS
//! keychain directly, and the biometric port with fixed-policy gates.

pub mod backend;
pub mod biometrics;
pub mod crypto;
pub mod error;
pub mod file_cache;
pub mod keychain;
pub mod keychain_cache;
pub mod types;

pub use backend::Cache;
pub use biometrics::{gate_for, TrustedGate, UnavailableGate};
pub use error::{Result, SecretError};
pub use file_cache::FileCredentialCache;
pub use keychain_cache::{KeychainCache, KeychainItem};
pub use types::{CachedEntry, StoredEntry};
