//! Shared helpers for the keypin integration tests.

use keypin_core::testing::{FakePresenter, FixedGate};
use keypin_core::{BiometricGate, CredentialCache, Dispatcher};
use keypin_secrets::{crypto, Cache, FileCredentialCache};
use std::path::Path;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Greeting line every transcript starts with.
pub const GREETING: &str = "OK Pleased to meet you\n";

/// Run `script` through the protocol loop and return everything written.
pub async fn transcript(dispatcher: &mut Dispatcher, script: &str) -> String {
    let mut output = Vec::new();
    keypin_cli::serve::serve(dispatcher, script.as_bytes(), &mut output)
        .await
        .expect("serve failed");
    String::from_utf8(output).expect("non-UTF-8 output")
}

/// A file-backed cache under `dir` sealed with `master_key`.
pub fn file_cache(dir: &Path, master_key: &Zeroizing<Vec<u8>>) -> Arc<Cache> {
    Arc::new(Cache::File(FileCredentialCache::new(
        dir.to_path_buf(),
        master_key.clone(),
    )))
}

/// A fresh random master key.
pub fn master_key() -> Zeroizing<Vec<u8>> {
    crypto::generate_master_key()
}

/// Dispatcher wired to the given collaborators.
pub fn dispatcher(
    presenter: &Arc<FakePresenter>,
    cache: Arc<dyn CredentialCache>,
    gate: &Arc<FixedGate>,
) -> Dispatcher {
    let biometrics: Arc<dyn BiometricGate> = gate.clone();
    Dispatcher::new(presenter.clone(), cache, biometrics)
}
