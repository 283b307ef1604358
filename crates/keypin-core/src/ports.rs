//! Collaborator ports.
//!
//! The core never draws a window, touches the keychain or talks to the
//! biometric API itself. It drives three injected collaborators:
//!
//! - [`Presenter`]: the presentation surface that collects input
//! - [`CredentialCache`]: optional external storage for credentials
//! - [`BiometricGate`]: the user-presence check guarding the cache

use crate::rendezvous::{rendezvous, Rendezvous, Signal};
use crate::secret::Credential;
use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by cache and biometric collaborators.
///
/// The dispatcher logs these and falls back to prompting; they never reach
/// the protocol caller.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Biometrics unavailable: {0}")]
    BiometricsUnavailable(String),

    #[error("Biometric check failed: {0}")]
    BiometricsFailed(String),
}

/// Convenience result alias for collaborator calls.
pub type PortResult<T> = std::result::Result<T, CollaboratorError>;

/// Everything the presenter needs to ask for a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRequest {
    pub title: String,
    /// Error text after a failed attempt, otherwise the description.
    pub description: String,
    pub prompt: String,
    pub key_info: String,
    pub ok_label: String,
    pub cancel_label: String,
    pub is_error: bool,
    /// Whether the presenter may offer to save the credential.
    pub allow_cache: bool,
    /// Label of the second field in double-entry mode.
    pub repeat_prompt: Option<String>,
    /// Shown when the two entries differ.
    pub repeat_error: String,
}

/// Result of an input request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputOutcome {
    /// `None` when the user cancelled.
    pub credential: Option<Credential>,
    pub save_requested: bool,
}

impl InputOutcome {
    /// A cancelled request.
    pub fn cancelled() -> Self {
        Self {
            credential: None,
            save_requested: false,
        }
    }

    /// A submitted credential.
    pub fn entered(credential: Credential, save_requested: bool) -> Self {
        Self {
            credential: Some(credential),
            save_requested,
        }
    }
}

/// A yes/no question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub title: String,
    pub description: String,
    pub ok_label: String,
    pub cancel_label: String,
}

/// A message the user only has to dismiss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRequest {
    pub title: String,
    pub description: String,
    pub ok_label: String,
}

/// Completion callback handed to the presenter with every request.
///
/// Completing is idempotent: once a value is delivered (by the presenter or
/// by a timeout) further calls are ignored. Dropping every clone without
/// completing counts as a cancellation.
#[derive(Debug)]
pub struct Completion<T> {
    signal: Signal<T>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            signal: self.signal.clone(),
        }
    }
}

impl<T> Completion<T> {
    /// Wrap the producer half of a rendezvous.
    pub fn new(signal: Signal<T>) -> Self {
        Self { signal }
    }

    /// Create a completion together with the rendezvous it feeds.
    pub fn channel() -> (Self, Rendezvous<T>) {
        let (signal, waiter) = rendezvous();
        (Self::new(signal), waiter)
    }

    /// Deliver the result. Returns `false` if the request was already
    /// completed or abandoned.
    pub fn complete(&self, value: T) -> bool {
        self.signal.signal(value)
    }

    /// Whether the request no longer accepts a result.
    pub fn is_done(&self) -> bool {
        self.signal.is_spent()
    }
}

/// The presentation surface.
///
/// Methods must return promptly; the interaction itself runs on the
/// presenter's own thread and ends by calling the [`Completion`].
pub trait Presenter: Send + Sync {
    /// Ask for a credential.
    fn request_input(&self, request: InputRequest, done: Completion<InputOutcome>);

    /// Ask a yes/no question.
    fn request_confirm(&self, request: ConfirmRequest, done: Completion<bool>);

    /// Show a message and wait for dismissal.
    fn request_message(&self, request: MessageRequest, done: Completion<()>);

    /// Tear down whatever is on screen. A pending completion that has not
    /// fired yet must be completed as cancelled.
    fn force_close(&self);
}

/// External credential storage keyed by the session's key info.
#[async_trait]
pub trait CredentialCache: Send + Sync {
    /// Fetch a stored credential.
    async fn lookup(&self, key: &str) -> PortResult<Option<Credential>>;

    /// Store a credential, replacing any previous one.
    async fn store(&self, key: &str, credential: &Credential, label: Option<&str>)
        -> PortResult<()>;
}

/// User-presence check run before a cached credential is released.
#[async_trait]
pub trait BiometricGate: Send + Sync {
    /// `Ok(true)` when the user passed, `Ok(false)` when they declined.
    async fn authenticate(&self, reason: &str) -> PortResult<bool>;
}
