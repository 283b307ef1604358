//! Assuan response assembly and percent-escaping.
//!
//! Outgoing data keeps ASCII letters and digits as-is and writes every other
//! byte of its UTF-8 form as `%XX`, so an encoded payload never contains a
//! space, a newline or a `%` that the caller could misread.

use crate::error::ProtocolError;
use crate::secret::Credential;
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};

/// One complete answer to a protocol command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `OK`
    Ok,
    /// `D <payload>` then `OK`. The payload is already escaped.
    Data(String),
    /// `ERR <code> <text>`
    Err(ProtocolError),
}

impl Response {
    /// Data response carrying free text.
    pub fn data(text: &str) -> Self {
        Self::Data(percent_encode(text))
    }

    /// Data response carrying a credential in its wire form.
    pub fn credential(credential: &Credential) -> Self {
        Self::Data(percent_encode(credential.normalized().expose()))
    }

    /// Render the response as it is written to the output stream, without a
    /// trailing newline.
    pub fn render(&self) -> String {
        match self {
            Self::Ok => "OK".to_string(),
            Self::Data(payload) => format!("D {payload}\nOK"),
            Self::Err(err) => format!("ERR {} {}", err.code(), err),
        }
    }
}

impl From<ProtocolError> for Response {
    fn from(err: ProtocolError) -> Self {
        Self::Err(err)
    }
}

/// Escape everything except ASCII alphanumerics; non-ASCII letters are
/// escaped byte by byte too.
pub fn percent_encode(text: &str) -> String {
    utf8_percent_encode(text, NON_ALPHANUMERIC).to_string()
}

/// Decode `%XX` escapes in an argument.
///
/// Input whose escapes do not decode to valid UTF-8 is returned unchanged.
pub fn percent_decode(text: &str) -> String {
    match percent_decode_str(text).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => text.to_string(),
    }
}
