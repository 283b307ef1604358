//! Error types for keypin core.

use std::path::PathBuf;
use thiserror::Error;

/// Core result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for keypin core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON5 parse error: {0}")]
    Json5(String),
}

/// Assuan error code for an operation cancelled by the user or a timeout.
pub const GPG_ERR_CANCELED: u32 = 83_886_179;

/// Assuan error code for a declined confirmation.
pub const GPG_ERR_NOT_CONFIRMED: u32 = 114;

/// Assuan error code for an unsupported request.
pub const GPG_ERR_NOT_SUPPORTED: u32 = 83_886_361;

/// Failures reported to the caller as an `ERR` line.
///
/// None of these are fatal; the dispatcher keeps reading commands after
/// emitting one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The user dismissed the prompt or the timeout fired.
    #[error("Operation cancelled")]
    Cancelled,

    /// The user answered a confirmation negatively.
    #[error("Operation cancelled")]
    NotConfirmed,

    /// A GETINFO request this helper does not answer.
    #[error("Not supported")]
    Unsupported(String),
}

impl ProtocolError {
    /// Get the numeric Assuan error code.
    pub fn code(&self) -> u32 {
        match self {
            Self::Cancelled => GPG_ERR_CANCELED,
            Self::NotConfirmed => GPG_ERR_NOT_CONFIRMED,
            Self::Unsupported(_) => GPG_ERR_NOT_SUPPORTED,
        }
    }
}
