//! End-to-end protocol sessions against the encrypted file cache.

use keypin_core::testing::{FakePresenter, FixedGate, MemoryCache};
use keypin_core::{Credential, CredentialCache, InputOutcome};
use keypin_integration_tests::{dispatcher, file_cache, master_key, transcript, GREETING};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const UNLOCK: &str = "SETDESC Please enter the passphrase:%0A%22Alice <alice@example.com>%22%0Akey, ID 0x1234567890ABCDEF,\n";

#[tokio::test]
async fn test_saved_credential_is_released_silently_next_time() {
    let dir = TempDir::new().unwrap();
    let key = master_key();

    // first session: the user types the passphrase and asks to save it
    let presenter = Arc::new(
        FakePresenter::new().with_input(InputOutcome::entered(Credential::new("s3cret pw"), true)),
    );
    let gate = Arc::new(FixedGate::allow());
    let mut first = dispatcher(&presenter, file_cache(dir.path(), &key), &gate);
    let script = format!(
        "OPTION allow-external-password-cache\nSETKEYINFO n/ABCDEF0123\n{UNLOCK}GETPIN\nBYE\n"
    );
    let out = transcript(&mut first, &script).await;
    assert_eq!(out, format!("{GREETING}OK\nOK\nOK\nD s3cret%20pw\nOK\nOK\n"));
    assert_eq!(presenter.input_requests().len(), 1);

    let entries = match file_cache(dir.path(), &key).as_ref() {
        keypin_secrets::Cache::File(cache) => cache.list().await.unwrap(),
        _ => unreachable!(),
    };
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, "ABCDEF0123");
    assert_eq!(entries[0].label, "Alice <alice@example.com> (1234567890ABCDEF)");

    // second session: no prompt, the biometric check releases the entry
    let presenter = Arc::new(FakePresenter::new());
    let mut second = dispatcher(&presenter, file_cache(dir.path(), &key), &gate);
    let out = transcript(
        &mut second,
        "OPTION allow-external-password-cache\nSETKEYINFO n/ABCDEF0123\nSETTITLE Unlock key\nGETPIN\n",
    )
    .await;
    assert_eq!(out, format!("{GREETING}OK\nOK\nOK\nD s3cret%20pw\nOK\n"));
    assert!(presenter.input_requests().is_empty());
    assert_eq!(gate.last_reason().as_deref(), Some("Unlock key"));
}

#[tokio::test]
async fn test_wrong_master_key_falls_back_to_prompt() {
    let dir = TempDir::new().unwrap();
    let cache = file_cache(dir.path(), &master_key());
    cache
        .store("K1", &Credential::new("old"), None)
        .await
        .unwrap();

    let presenter = Arc::new(
        FakePresenter::new().with_input(InputOutcome::entered(Credential::new("typed"), false)),
    );
    let gate = Arc::new(FixedGate::allow());
    let mut d = dispatcher(&presenter, file_cache(dir.path(), &master_key()), &gate);
    let out = transcript(
        &mut d,
        "OPTION allow-external-password-cache\nSETKEYINFO s/K1\nGETPIN\n",
    )
    .await;

    assert_eq!(out, format!("{GREETING}OK\nOK\nD typed\nOK\n"));
    assert_eq!(presenter.input_requests().len(), 1);
}

#[tokio::test]
async fn test_retry_after_bad_passphrase_skips_cache() {
    let cache = Arc::new(MemoryCache::new().with_entry("K2", "stale"));
    let presenter = Arc::new(
        FakePresenter::new().with_input(InputOutcome::entered(Credential::new("fresh"), false)),
    );
    let gate = Arc::new(FixedGate::allow());
    let mut d = dispatcher(&presenter, cache.clone(), &gate);

    let out = transcript(
        &mut d,
        "OPTION allow-external-password-cache\nSETKEYINFO n/K2\nSETERROR Bad Passphrase\nGETPIN\n",
    )
    .await;

    assert_eq!(out, format!("{GREETING}OK\nOK\nOK\nD fresh\nOK\n"));
    assert_eq!(cache.lookup_count(), 0);
    assert_eq!(gate.call_count(), 0);

    let request = &presenter.input_requests()[0];
    assert!(request.is_error);
    assert_eq!(request.description, "Incorrect passphrase. Please try again.");
}

#[tokio::test]
async fn test_timeout_cancels_prompt_and_session_continues() {
    let presenter = Arc::new(FakePresenter::silent());
    let gate = Arc::new(FixedGate::deny());
    let mut d = dispatcher(&presenter, Arc::new(MemoryCache::new()), &gate);

    let started = Instant::now();
    let out = transcript(&mut d, "SETTIMEOUT 1\nGETPIN\nGETINFO flavor\nBYE\n").await;

    assert!(started.elapsed() >= Duration::from_millis(900));
    assert_eq!(
        out,
        format!("{GREETING}OK\nERR 83886179 Operation cancelled\nD keypin\nOK\nOK\n")
    );
    assert_eq!(presenter.force_close_count(), 1);
}

#[tokio::test]
async fn test_confirm_and_message_session() {
    let presenter = Arc::new(FakePresenter::new().with_confirm(true).with_confirm(false));
    let gate = Arc::new(FixedGate::deny());
    let mut d = dispatcher(&presenter, Arc::new(MemoryCache::new()), &gate);

    let out = transcript(
        &mut d,
        "SETOK Allow\nCONFIRM\nCONFIRM\nMESSAGE\nSETNOTOK Later\nCONFIRM --one-button\n",
    )
    .await;

    assert_eq!(
        out,
        format!("{GREETING}OK\nOK\nERR 114 Operation cancelled\nOK\nOK\nERR 114 Operation cancelled\n")
    );
    assert_eq!(presenter.confirm_requests()[0].ok_label, "Allow");
    assert_eq!(presenter.message_requests().len(), 1);
}
