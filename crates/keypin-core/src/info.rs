//! GETINFO answers.

use crate::encoding::Response;
use crate::env;
use crate::error::ProtocolError;

/// Implementation name reported for `GETINFO flavor`.
pub const FLAVOR: &str = "keypin";

/// Facts about the process and its terminal, captured once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub pid: u32,
    pub version: String,
    pub tty_name: Option<String>,
    pub tty_type: Option<String>,
    pub display: Option<String>,
}

impl Default for HostInfo {
    fn default() -> Self {
        Self {
            pid: std::process::id(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            tty_name: None,
            tty_type: None,
            display: None,
        }
    }
}

impl HostInfo {
    /// Gather terminal details from `GPG_TTY`, `TERM` and `DISPLAY`, falling
    /// back to the terminal attached to this process for the tty name.
    pub fn from_env() -> Self {
        Self {
            tty_name: env::get_var(env::vars::GPG_TTY).or_else(platform_tty_name),
            tty_type: env::get_var(env::vars::TERM),
            display: env::get_var(env::vars::DISPLAY),
            ..Self::default()
        }
    }

    /// Override the tty name (from `--ttyname`).
    pub fn with_tty_name(mut self, tty_name: impl Into<String>) -> Self {
        self.tty_name = Some(tty_name.into());
        self
    }

    /// Override the terminal type (from `--ttytype`).
    pub fn with_tty_type(mut self, tty_type: impl Into<String>) -> Self {
        self.tty_type = Some(tty_type.into());
        self
    }

    /// Override the display (from `--display`).
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Answer a GETINFO sub-request. `request` is already trimmed and
    /// decoded.
    pub fn answer(&self, request: &str) -> Response {
        match request {
            "" | "pid" => Response::data(&self.pid.to_string()),
            "version" => Response::data(&self.version),
            "tty_name" => Response::data(self.tty_name.as_deref().unwrap_or_default()),
            "ttyinfo" => {
                let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
                let line = format!(
                    "{} {} {}",
                    field(&self.tty_name),
                    field(&self.tty_type),
                    field(&self.display)
                );
                Response::data(&line)
            }
            "flavor" => Response::data(FLAVOR),
            "socket_name" | "display" => Response::data(""),
            other => Response::Err(ProtocolError::Unsupported(other.to_string())),
        }
    }
}

/// Terminal attached to one of the standard streams, if any.
#[cfg(target_os = "linux")]
fn platform_tty_name() -> Option<String> {
    ["2", "1", "0"].iter().find_map(|fd| {
        let target = std::fs::read_link(format!("/proc/self/fd/{fd}")).ok()?;
        let path = target.to_string_lossy().into_owned();
        (path.starts_with("/dev/pts/") || path.starts_with("/dev/tty")).then_some(path)
    })
}

#[cfg(not(target_os = "linux"))]
fn platform_tty_name() -> Option<String> {
    None
}
