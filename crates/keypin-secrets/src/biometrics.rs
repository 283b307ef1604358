//! Biometric gate adapters.

use std::sync::Arc;

use async_trait::async_trait;
use keypin_core::config::BiometricsMode;
use keypin_core::ports::PortResult;
use keypin_core::{BiometricGate, CollaboratorError};
use tracing::debug;

/// No sensor: every check fails, so cached credentials are never released
/// without a prompt.
#[derive(Debug, Default)]
pub struct UnavailableGate;

#[async_trait]
impl BiometricGate for UnavailableGate {
    async fn authenticate(&self, _reason: &str) -> PortResult<bool> {
        Err(CollaboratorError::BiometricsUnavailable(
            "no biometric sensor configured".to_string(),
        ))
    }
}

/// Possession of the cache is enough; every check passes.
#[derive(Debug, Default)]
pub struct TrustedGate;

#[async_trait]
impl BiometricGate for TrustedGate {
    async fn authenticate(&self, reason: &str) -> PortResult<bool> {
        debug!(reason, "trusting cache without user presence check");
        Ok(true)
    }
}

/// The gate for the configured mode.
pub fn gate_for(mode: BiometricsMode) -> Arc<dyn BiometricGate> {
    match mode {
        BiometricsMode::Unavailable => Arc::new(UnavailableGate),
        BiometricsMode::Trusted => Arc::new(TrustedGate),
    }
}
