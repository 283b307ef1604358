//! AES-256-GCM sealing with HKDF-SHA256 key derivation.
//!
//! Every cache entry gets its own random salt, so the master key never
//! encrypts anything directly. The random nonce travels in front of the
//! ciphertext; an entry only needs to keep `(ciphertext, salt)`.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{Result, SecretError};

const NONCE_SIZE: usize = 12;
const SALT_SIZE: usize = 32;

/// Length of the master key and of every derived key.
pub const KEY_SIZE: usize = 32;

const HKDF_INFO: &[u8] = b"keypin-credential-v1";

/// Ciphertext plus the salt its key was derived with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    /// `nonce || ciphertext || tag`
    pub ciphertext: Vec<u8>,
    pub salt: Vec<u8>,
}

impl Sealed {
    /// Base64 ciphertext and hex salt, as written to disk.
    pub fn to_text(&self) -> (String, String) {
        (STANDARD.encode(&self.ciphertext), hex::encode(&self.salt))
    }

    /// Inverse of [`Sealed::to_text`].
    pub fn from_text(ciphertext: &str, salt: &str) -> Result<Self> {
        let ciphertext = STANDARD
            .decode(ciphertext)
            .map_err(|e| SecretError::DecryptionFailed(format!("base64 decode failed: {e}")))?;
        let salt = hex::decode(salt)
            .map_err(|e| SecretError::DecryptionFailed(format!("hex decode failed: {e}")))?;
        Ok(Self { ciphertext, salt })
    }
}

fn derive_key(master_key: &[u8], salt: &[u8]) -> Zeroizing<[u8; KEY_SIZE]> {
    let hk = Hkdf::<Sha256>::new(Some(salt), master_key);
    let mut okm = Zeroizing::new([0u8; KEY_SIZE]);
    // 32 bytes is far below the 255 * HashLen limit
    hk.expand(HKDF_INFO, &mut *okm)
        .expect("HKDF expand should not fail for 32-byte output");
    okm
}

fn cipher(master_key: &[u8], salt: &[u8]) -> Result<Aes256Gcm> {
    let key = derive_key(master_key, salt);
    Aes256Gcm::new_from_slice(&key[..]).map_err(|e| SecretError::EncryptionFailed(e.to_string()))
}

/// Encrypt `plaintext` under a fresh salt and nonce.
pub fn seal(master_key: &[u8], plaintext: &[u8]) -> Result<Sealed> {
    let mut salt = vec![0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);
    let mut nonce = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce);

    let encrypted = cipher(master_key, &salt)?
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| SecretError::EncryptionFailed(e.to_string()))?;

    let mut ciphertext = Vec::with_capacity(NONCE_SIZE + encrypted.len());
    ciphertext.extend_from_slice(&nonce);
    ciphertext.extend_from_slice(&encrypted);
    Ok(Sealed { ciphertext, salt })
}

/// Decrypt and authenticate a [`Sealed`] value.
pub fn open(master_key: &[u8], sealed: &Sealed) -> Result<Zeroizing<Vec<u8>>> {
    if sealed.ciphertext.len() < NONCE_SIZE {
        return Err(SecretError::DecryptionFailed(
            "ciphertext too short".to_string(),
        ));
    }
    let (nonce, ciphertext) = sealed.ciphertext.split_at(NONCE_SIZE);

    cipher(master_key, &sealed.salt)
        .map_err(|e| SecretError::DecryptionFailed(e.to_string()))?
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map(Zeroizing::new)
        .map_err(|e| SecretError::DecryptionFailed(e.to_string()))
}

/// Generate a new random master key.
pub fn generate_master_key() -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(vec![0u8; KEY_SIZE]);
    rand::thread_rng().fill_bytes(key.as_mut_slice());
    key
}
