//! Terminal rendering utilities.
//!
//! Styling is decided against stderr: stdout is the protocol pipe and never
//! a terminal while serving.

use console::{style, Emoji};

pub static CHECK: Emoji = Emoji("✓", "+");
pub static CROSS: Emoji = Emoji("✗", "x");
pub static WARN: Emoji = Emoji("⚠", "!");

/// Window title line.
pub fn title(text: &str) -> String {
    style(text).bold().cyan().for_stderr().to_string()
}

/// Description, or an error message shown in its place.
pub fn description(text: &str, is_error: bool) -> String {
    if is_error {
        format!("{} {}", style(WARN).red().for_stderr(), style(text).red().for_stderr())
    } else {
        text.to_string()
    }
}

/// A labelled detail line, such as the keygrip.
pub fn detail(label: &str, value: &str) -> String {
    format!("  {} {}", style(format!("{label}:")).dim().for_stderr(), value)
}

/// A dimmed usage hint.
pub fn hint(text: &str) -> String {
    style(text).dim().for_stderr().to_string()
}

/// An inline error, such as mismatched double entry.
pub fn error(text: &str) -> String {
    format!("{} {}", style(CROSS).red().for_stderr(), text)
}

/// A passed check.
pub fn ok_line(text: &str) -> String {
    format!("  {} {}", style(CHECK).green(), text)
}

/// A failed check.
pub fn fail_line(text: &str) -> String {
    format!("  {} {}", style(CROSS).red(), text)
}

/// A check that passed with a caveat.
pub fn warn_line(text: &str) -> String {
    format!("  {} {}", style(WARN).yellow(), text)
}
