//! Human-readable labels for cached credentials.
//!
//! The agent's description text usually looks like
//!
//! ```text
//! Please enter the passphrase to unlock the OpenPGP secret key:
//! "Alice Example <alice@example.com>"
//! 255-bit EDDSA key, ID 0x1234567890ABCDEF,
//! ```
//!
//! Two independent scans pick out the quoted user id and the key id; the
//! label combines whichever were found.

/// Minimum number of hex digits accepted as a key id.
const MIN_KEY_ID_LEN: usize = 8;

/// Maximum number of hex digits taken as a key id.
const MAX_KEY_ID_LEN: usize = 40;

/// Derive a label such as `Alice Example (ABCDEF0123456789)` from a
/// description. Returns `None` when neither a name nor a key id is present.
pub fn extract_label(description: &str) -> Option<String> {
    let name = quoted_name(description);
    let key_id = key_id(description).map(|id| id.to_ascii_uppercase());

    match (name, key_id) {
        (Some(name), Some(id)) => Some(format!("{name} ({id})")),
        (Some(name), None) => Some(name.to_string()),
        (None, Some(id)) => Some(format!("GPG ID {id}")),
        (None, None) => None,
    }
}

/// Text between the first and the last double quote.
fn quoted_name(text: &str) -> Option<&str> {
    let start = text.find('"')?;
    let end = text.rfind('"')?;
    if start == end {
        return None;
    }
    Some(&text[start + 1..end])
}

/// First `ID` marker (any case) followed by separators, an optional `0x` and
/// 8 to 40 hex digits.
fn key_id(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i].eq_ignore_ascii_case(&b'i') && bytes[i + 1].eq_ignore_ascii_case(&b'd') {
            if let Some(range) = hex_after_marker(text, i + 2) {
                return Some(&text[range]);
            }
        }
        i += 1;
    }
    None
}

fn hex_after_marker(text: &str, from: usize) -> Option<std::ops::Range<usize>> {
    let rest = &text[from..];

    let separators: usize = rest
        .chars()
        .take_while(|c| *c == ':' || c.is_whitespace())
        .map(char::len_utf8)
        .sum();
    if separators == 0 {
        return None;
    }

    let mut start = from + separators;
    let after = &text[start..];
    if after.len() >= 2 && after.as_bytes()[0] == b'0' && after.as_bytes()[1].eq_ignore_ascii_case(&b'x') {
        start += 2;
    }

    let digits = text[start..]
        .bytes()
        .take(MAX_KEY_ID_LEN)
        .take_while(u8::is_ascii_hexdigit)
        .count();

    (digits >= MIN_KEY_ID_LEN).then(|| start..start + digits)
}
