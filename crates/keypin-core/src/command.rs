//! Request line parsing.

use crate::encoding::percent_decode;

/// Commands understood by the dispatcher. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetDesc,
    SetPrompt,
    SetTitle,
    SetError,
    SetOk,
    SetCancel,
    SetNotOk,
    SetKeyInfo,
    SetRepeat,
    SetRepeatError,
    SetTimeout,
    Option,
    SetQualityBar,
    SetQualityBarTooltip,
    GetPin,
    Confirm,
    Message,
    GetInfo,
    Bye,
    /// Anything else, upper-cased. Acknowledged with `OK`.
    Unknown(String),
}

impl Command {
    /// Look up a command token.
    pub fn from_token(token: &str) -> Self {
        match token.to_ascii_uppercase().as_str() {
            "SETDESC" => Self::SetDesc,
            "SETPROMPT" => Self::SetPrompt,
            "SETTITLE" => Self::SetTitle,
            "SETERROR" => Self::SetError,
            "SETOK" => Self::SetOk,
            "SETCANCEL" => Self::SetCancel,
            "SETNOTOK" => Self::SetNotOk,
            "SETKEYINFO" => Self::SetKeyInfo,
            "SETREPEAT" => Self::SetRepeat,
            "SETREPEATERROR" => Self::SetRepeatError,
            "SETTIMEOUT" => Self::SetTimeout,
            "OPTION" => Self::Option,
            "SETQUALITYBAR" => Self::SetQualityBar,
            "SETQUALITYBAR_TT" => Self::SetQualityBarTooltip,
            "GETPIN" => Self::GetPin,
            "CONFIRM" => Self::Confirm,
            "MESSAGE" => Self::Message,
            "GETINFO" => Self::GetInfo,
            "BYE" => Self::Bye,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// A parsed request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request<'a> {
    pub command: Command,
    /// Remainder after the first space, exactly as received.
    pub raw_args: &'a str,
    /// Remainder with percent-escapes decoded.
    pub args: String,
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Option<Request<'_>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (token, raw_args) = line.split_once(' ').unwrap_or((line, ""));
    Some(Request {
        command: Command::from_token(token),
        raw_args,
        args: percent_decode(raw_args),
    })
}
