//! OS keychain access and master key resolution.
//!
//! The file cache's master key is resolved in priority order:
//! 1. `KEYPIN_MASTER_KEY` environment variable (hex-encoded)
//! 2. OS keychain (macOS Keychain via Security.framework)
//! 3. Generate a new key and store it in the keychain
//!
//! Other platforms have no keychain here; only the environment variable
//! makes a master key survive a restart.

use crate::crypto::{self, KEY_SIZE};
use crate::error::{Result, SecretError};
use crate::keychain_cache::KeychainItem;
use keypin_core::env::{self, vars};
use tracing::{debug, warn};
use zeroize::Zeroizing;

const MASTER_KEY_SERVICE: &str = "keypin";
const MASTER_KEY_ACCOUNT: &str = "cache-master-key";

/// Resolve the master key for the encrypted file cache, creating one on
/// first use.
pub fn get_or_create_master_key() -> Result<Zeroizing<Vec<u8>>> {
    if let Some(hex_key) = env::get_var(vars::KEYPIN_MASTER_KEY) {
        debug!("using master key from environment variable");
        let hex_key = Zeroizing::new(hex_key);
        return decode_master_key(&hex_key, vars::KEYPIN_MASTER_KEY);
    }

    if is_available() {
        if let Some(stored) = find_password(MASTER_KEY_SERVICE, MASTER_KEY_ACCOUNT)? {
            debug!("using master key from OS keychain");
            let text = String::from_utf8(stored).map_err(|e| {
                SecretError::KeychainError(format!("keychain data is not valid UTF-8: {e}"))
            })?;
            return decode_master_key(&Zeroizing::new(text), "keychain entry");
        }
    }

    let key = crypto::generate_master_key();
    if is_available() {
        debug!("generating new master key and storing in keychain");
        let hex_key = Zeroizing::new(hex::encode(&key[..]));
        save_password(MASTER_KEY_SERVICE, MASTER_KEY_ACCOUNT, hex_key.as_bytes())?;
    } else {
        warn!(
            "no OS keychain on this platform; cached credentials will be unreadable after exit. \
             Set {} to a hex-encoded 32-byte key to keep them.",
            vars::KEYPIN_MASTER_KEY
        );
    }
    Ok(key)
}

fn decode_master_key(hex_key: &str, source: &str) -> Result<Zeroizing<Vec<u8>>> {
    let key = Zeroizing::new(
        hex::decode(hex_key.trim())
            .map_err(|e| SecretError::KeychainError(format!("invalid hex in {source}: {e}")))?,
    );
    if key.len() != KEY_SIZE {
        return Err(SecretError::KeychainError(format!(
            "{source} must decode to exactly {KEY_SIZE} bytes, got {}",
            key.len()
        )));
    }
    Ok(key)
}

/// Whether this build can talk to an OS keychain.
pub fn is_available() -> bool {
    cfg!(target_os = "macos")
}

// ---------------------------------------------------------------------------
// macOS keychain implementation
// ---------------------------------------------------------------------------

/// `errSecItemNotFound`
#[cfg(target_os = "macos")]
const ITEM_NOT_FOUND: i32 = -25300;

/// Read a generic password item.
#[cfg(target_os = "macos")]
pub fn find_password(service: &str, account: &str) -> Result<Option<Vec<u8>>> {
    use security_framework::passwords::get_generic_password;

    match get_generic_password(service, account) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.code() == ITEM_NOT_FOUND => Ok(None),
        Err(e) => Err(SecretError::KeychainError(format!("keychain read failed: {e}"))),
    }
}

/// Create or replace a generic password item.
#[cfg(target_os = "macos")]
pub fn save_password(service: &str, account: &str, data: &[u8]) -> Result<()> {
    use security_framework::passwords::set_generic_password;

    set_generic_password(service, account, data)
        .map_err(|e| SecretError::KeychainError(format!("keychain write failed: {e}")))
}

/// Write `item`, replacing any item with the same service and account so
/// the label is refreshed too.
#[cfg(target_os = "macos")]
pub fn save_item(item: &KeychainItem) -> Result<()> {
    use core_foundation::data::CFData;
    use security_framework::item::{add_item, ItemAddOptions, ItemAddValue, ItemClass};

    delete_password(&item.service, &item.account)?;

    let mut options = ItemAddOptions::new(ItemAddValue::Data {
        class: ItemClass::generic_password(),
        data: CFData::from_buffer(&item.data[..]),
    });
    options
        .set_service(&item.service)
        .set_account_name(&item.account)
        .set_label(&item.label);

    add_item(options.to_dictionary())
        .map_err(|e| SecretError::KeychainError(format!("keychain write failed: {e}")))
}

/// Delete a generic password item. Returns whether one existed.
#[cfg(target_os = "macos")]
pub fn delete_password(service: &str, account: &str) -> Result<bool> {
    use security_framework::passwords::delete_generic_password;

    match delete_generic_password(service, account) {
        Ok(()) => Ok(true),
        Err(e) if e.code() == ITEM_NOT_FOUND => Ok(false),
        Err(e) => Err(SecretError::KeychainError(format!("keychain delete failed: {e}"))),
    }
}

// ---------------------------------------------------------------------------
// Other platforms
// ---------------------------------------------------------------------------

#[cfg(not(target_os = "macos"))]
pub fn find_password(_service: &str, _account: &str) -> Result<Option<Vec<u8>>> {
    Err(SecretError::Unsupported("the OS keychain"))
}

#[cfg(not(target_os = "macos"))]
pub fn save_password(_service: &str, _account: &str, _data: &[u8]) -> Result<()> {
    Err(SecretError::Unsupported("the OS keychain"))
}

#[cfg(not(target_os = "macos"))]
pub fn save_item(_item: &KeychainItem) -> Result<()> {
    Err(SecretError::Unsupported("the OS keychain"))
}

#[cfg(not(target_os = "macos"))]
pub fn delete_password(_service: &str, _account: &str) -> Result<bool> {
    Err(SecretError::Unsupported("the OS keychain"))
}
