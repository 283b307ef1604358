//! Per-process protocol session state.
//!
//! One [`SessionState`] lives for the lifetime of the helper process. It is
//! owned by the [`Dispatcher`](crate::Dispatcher); interaction flows only see
//! snapshots copied into their requests.

use crate::label;

/// Default description shown when the agent sends none.
pub const DEFAULT_DESCRIPTION: &str = "Please enter your passphrase";

/// Default input prompt.
pub const DEFAULT_PROMPT: &str = "Passphrase:";

/// Default window title.
pub const DEFAULT_TITLE: &str = "GPG Pinentry";

/// Cache key used until the agent sends SETKEYINFO.
pub const DEFAULT_KEY_INFO: &str = "default";

/// Default affirmative button label.
pub const DEFAULT_OK: &str = "OK";

/// Default cancel button label.
pub const DEFAULT_CANCEL: &str = "Cancel";

/// Default message for mismatched double entry.
pub const DEFAULT_REPEAT_ERROR: &str = "Passphrases do not match";

/// Text shown after SETERROR, whatever the agent sent.
pub const INCORRECT_PASSPHRASE: &str = "Incorrect passphrase. Please try again.";

/// Configuration accumulated from SET* and OPTION commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub description: String,
    pub prompt: String,
    key_info: String,
    pub window_title: String,

    /// Set by a prior failed attempt; shown instead of the description.
    pub error_text: Option<String>,

    pub ok_text: String,
    pub cancel_text: String,
    /// Alternate cancel label; wins over `cancel_text` when present.
    pub not_ok_text: Option<String>,

    /// Enables double-entry mode.
    pub repeat_prompt: Option<String>,
    pub repeat_error: String,

    /// Seconds before a prompt is force-closed. 0 disables the timeout.
    pub timeout_seconds: u64,

    /// Sticky: set once by OPTION, never reset.
    pub allow_external_cache: bool,

    generated_label: Option<String>,

    /// Value `timeout_seconds` returns to on reset (from `--timeout`).
    default_timeout: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            description: DEFAULT_DESCRIPTION.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            key_info: DEFAULT_KEY_INFO.to_string(),
            window_title: DEFAULT_TITLE.to_string(),
            error_text: None,
            ok_text: DEFAULT_OK.to_string(),
            cancel_text: DEFAULT_CANCEL.to_string(),
            not_ok_text: None,
            repeat_prompt: None,
            repeat_error: DEFAULT_REPEAT_ERROR.to_string(),
            timeout_seconds: 0,
            allow_external_cache: false,
            generated_label: None,
            default_timeout: 0,
        }
    }
}

impl SessionState {
    /// Create a session with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `seconds` as the timeout whenever none was set by the agent.
    pub fn with_default_timeout(mut self, seconds: u64) -> Self {
        self.default_timeout = seconds;
        self.timeout_seconds = seconds;
        self
    }

    /// Set the description and recompute the cache label from it.
    pub fn set_description(&mut self, description: String) {
        self.generated_label = label::extract_label(&description);
        self.description = description;
    }

    /// Label derived from the current description, if any.
    pub fn generated_label(&self) -> Option<&str> {
        self.generated_label.as_deref()
    }

    /// The opaque cache key. Never empty.
    pub fn key_info(&self) -> &str {
        &self.key_info
    }

    /// Store a key identifier taken from the raw SETKEYINFO argument.
    ///
    /// Only the first space-separated token is used. A `<tag>/` prefix is
    /// dropped; `--clear` or an empty identifier restores the default.
    pub fn set_key_info(&mut self, raw: &str) {
        let token = raw.trim().split(' ').next().unwrap_or_default();
        let key = match token.split_once('/') {
            Some((_, rest)) => rest,
            None => token,
        };

        self.key_info = if key.is_empty() || token == "--clear" {
            DEFAULT_KEY_INFO.to_string()
        } else {
            key.to_string()
        };
    }

    /// Description actually shown: the error text after a failed attempt.
    pub fn effective_description(&self) -> &str {
        self.error_text.as_deref().unwrap_or(&self.description)
    }

    /// Cancel button label actually shown.
    pub fn effective_cancel(&self) -> &str {
        self.not_ok_text.as_deref().unwrap_or(&self.cancel_text)
    }

    /// Whether the description is being replaced by an error message.
    pub fn is_error(&self) -> bool {
        self.error_text.is_some()
    }

    /// Reset the fields a completed GETPIN consumed.
    pub fn reset_after_get_pin(&mut self) {
        self.error_text = None;
        self.not_ok_text = None;
        self.repeat_prompt = None;
        self.timeout_seconds = self.default_timeout;
    }

    /// Reset the fields a completed CONFIRM consumed.
    pub fn reset_after_confirm(&mut self) {
        self.not_ok_text = None;
    }
}
