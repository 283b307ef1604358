//! The silent path: releasing a cached credential without a prompt.

use crate::ports::{BiometricGate, CredentialCache};
use crate::secret::Credential;
use crate::session::SessionState;
use std::sync::Arc;
use tracing::{debug, warn};

/// Decides whether a prompt can be skipped and keeps the cache up to date.
///
/// Every cache or biometric failure downgrades to "prompt the user"; nothing
/// here produces a protocol error.
pub struct CredentialGate {
    cache: Arc<dyn CredentialCache>,
    biometrics: Arc<dyn BiometricGate>,
    reason: Option<String>,
}

impl CredentialGate {
    /// Create a gate over the given collaborators.
    pub fn new(cache: Arc<dyn CredentialCache>, biometrics: Arc<dyn BiometricGate>) -> Self {
        Self {
            cache,
            biometrics,
            reason: None,
        }
    }

    /// Use a fixed reason string for the biometric check instead of the
    /// window title.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Whether the session allows trying the cache at all.
    ///
    /// Double entry and retries after a wrong passphrase always prompt.
    pub fn is_eligible(session: &SessionState) -> bool {
        session.repeat_prompt.is_none()
            && session.error_text.is_none()
            && session.allow_external_cache
    }

    /// Return the cached credential for the session's key if the session is
    /// eligible, the cache has one and the user passes the biometric check.
    pub async fn try_silent(&self, session: &SessionState) -> Option<Credential> {
        if !Self::is_eligible(session) {
            return None;
        }

        let key = session.key_info();
        let cached = match self.cache.lookup(key).await {
            Ok(Some(credential)) => credential,
            Ok(None) => {
                debug!(key, "no cached credential");
                return None;
            }
            Err(e) => {
                warn!(key, "cache lookup failed, prompting instead: {e}");
                return None;
            }
        };

        let reason = self.reason.as_deref().unwrap_or(&session.window_title);
        match self.biometrics.authenticate(reason).await {
            Ok(true) => {
                debug!(key, "biometric check passed, using cached credential");
                Some(cached)
            }
            Ok(false) => {
                debug!(key, "biometric check declined");
                None
            }
            Err(e) => {
                warn!(key, "biometric check unavailable, prompting instead: {e}");
                None
            }
        }
    }

    /// Store a freshly entered credential when the user asked for it and the
    /// agent allows external caching.
    pub async fn remember(&self, session: &SessionState, credential: &Credential, save_requested: bool) {
        if !save_requested || !session.allow_external_cache {
            return;
        }

        let key = session.key_info();
        match self
            .cache
            .store(key, credential, session.generated_label())
            .await
        {
            Ok(()) => debug!(key, label = ?session.generated_label(), "credential cached"),
            Err(e) => warn!(key, "failed to cache credential: {e}"),
        }
    }
}
