//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Common environment variable names.
pub mod vars {
    /// Keypin home directory override.
    pub const KEYPIN_HOME: &str = "KEYPIN_HOME";

    /// Keypin config file override.
    pub const KEYPIN_CONFIG: &str = "KEYPIN_CONFIG";

    /// Keypin log filter.
    pub const KEYPIN_LOG: &str = "KEYPIN_LOG";

    /// Hex-encoded master key for the encrypted file cache.
    pub const KEYPIN_MASTER_KEY: &str = "KEYPIN_MASTER_KEY";

    /// Terminal the agent was started from.
    pub const GPG_TTY: &str = "GPG_TTY";

    /// Terminal type.
    pub const TERM: &str = "TERM";

    /// X11 display.
    pub const DISPLAY: &str = "DISPLAY";
}
