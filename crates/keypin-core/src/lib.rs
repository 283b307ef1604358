//! # keypin-core
//!
//! Protocol command processor and credential-retrieval state machine for the
//! keypin PIN-entry helper.
//!
//! This crate contains everything that has state or a wire contract:
//!
//! - **Protocol**: line parsing, [`Dispatcher`], percent-encoding of responses
//! - **Session**: per-process [`SessionState`] and its reset rules
//! - **Retrieval**: the silent cache path ([`gate`]), the cancellable
//!   [`timeout`] and the single-use [`rendezvous`]
//! - **Ports**: the [`Presenter`], [`CredentialCache`] and [`BiometricGate`]
//!   traits implemented by the UI and storage crates
//! - **Utilities**: configuration, path resolution and environment handling

pub mod command;
pub mod config;
pub mod dispatcher;
pub mod encoding;
pub mod env;
pub mod error;
pub mod flows;
pub mod gate;
pub mod info;
pub mod label;
pub mod paths;
pub mod ports;
pub mod rendezvous;
pub mod secret;
pub mod session;
pub mod testing;
pub mod timeout;

// Re-exports for convenience
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::{ConfigError, Error, ProtocolError, Result};
pub use info::HostInfo;
pub use ports::{
    BiometricGate, CollaboratorError, Completion, ConfirmRequest, CredentialCache,
    InputOutcome, InputRequest, MessageRequest, Presenter,
};
pub use secret::Credential;
pub use session::SessionState;
