//! Credentials held in zeroizing memory.

use std::fmt;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A passphrase or PIN travelling between the presenter, the cache and the
/// protocol encoder.
///
/// The buffer is wiped on drop, Debug and Display both emit `[REDACTED]`, and
/// equality runs in constant time.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    inner: String,
}

impl Credential {
    /// Wrap a plaintext credential.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: value.into(),
        }
    }

    /// Expose the plaintext value.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Check if the credential is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The form sent over the wire: newline characters removed (pasted
    /// input often carries a trailing one) and canonically composed (NFC).
    pub fn normalized(&self) -> Credential {
        let composed: String = self
            .expose()
            .chars()
            .filter(|c| !is_newline(*c))
            .nfc()
            .collect();
        Credential::new(composed)
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(self.inner.as_bytes(), other.inner.as_bytes())
    }
}

impl Eq for Credential {}

// Never print secrets
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Unicode line terminators, matching what a text field treats as a newline.
fn is_newline(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
