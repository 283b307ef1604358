//! The protocol command dispatcher.

use crate::command::{parse_line, Command, Request};
use crate::encoding::Response;
use crate::flows;
use crate::gate::CredentialGate;
use crate::info::HostInfo;
use crate::ports::{BiometricGate, CredentialCache, Presenter};
use crate::session::{SessionState, DEFAULT_CANCEL, DEFAULT_OK, INCORRECT_PASSPHRASE};
use std::sync::Arc;
use tracing::debug;

/// OPTION detail that enables the external credential cache.
const ALLOW_EXTERNAL_CACHE: &str = "allow-external-password-cache";

/// Turns request lines into responses.
///
/// Owns the session for the lifetime of the connection. `handle` takes
/// `&mut self`, so at most one flow is in progress at any time.
pub struct Dispatcher {
    session: SessionState,
    presenter: Arc<dyn Presenter>,
    gate: CredentialGate,
    host: HostInfo,
}

impl Dispatcher {
    /// Create a dispatcher with a fresh session.
    pub fn new(
        presenter: Arc<dyn Presenter>,
        cache: Arc<dyn CredentialCache>,
        biometrics: Arc<dyn BiometricGate>,
    ) -> Self {
        Self {
            session: SessionState::new(),
            presenter,
            gate: CredentialGate::new(cache, biometrics),
            host: HostInfo::default(),
        }
    }

    /// Answer GETINFO from `host`.
    pub fn with_host_info(mut self, host: HostInfo) -> Self {
        self.host = host;
        self
    }

    /// Apply `seconds` as the timeout whenever the agent has not set one.
    pub fn with_default_timeout(mut self, seconds: u64) -> Self {
        self.session = self.session.with_default_timeout(seconds);
        self
    }

    /// Use a fixed biometric reason instead of the window title.
    pub fn with_biometric_reason(mut self, reason: impl Into<String>) -> Self {
        self.gate = self.gate.with_reason(reason);
        self
    }

    /// Current session state.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Handle one request line.
    ///
    /// Returns `None` for blank lines and comments, otherwise the rendered
    /// response without a trailing newline.
    pub async fn handle(&mut self, line: &str) -> Option<String> {
        let request = parse_line(line)?;
        debug!(command = ?request.command, "handling command");
        Some(self.dispatch(request).await.render())
    }

    async fn dispatch(&mut self, request: Request<'_>) -> Response {
        let Request {
            command,
            raw_args,
            args,
        } = request;
        let session = &mut self.session;

        match command {
            Command::SetDesc => session.set_description(args),
            Command::SetPrompt => session.prompt = args,
            Command::SetTitle => session.window_title = args,
            Command::SetError => session.error_text = Some(INCORRECT_PASSPHRASE.to_string()),
            Command::SetOk => session.ok_text = or_default(args, DEFAULT_OK),
            Command::SetCancel => session.cancel_text = or_default(args, DEFAULT_CANCEL),
            Command::SetNotOk => session.not_ok_text = Some(args),
            Command::SetKeyInfo => session.set_key_info(raw_args),
            Command::SetRepeat => session.repeat_prompt = Some(args),
            Command::SetRepeatError => session.repeat_error = args,
            Command::SetTimeout => session.timeout_seconds = args.trim().parse().unwrap_or(0),
            Command::Option => {
                if args.contains(ALLOW_EXTERNAL_CACHE) {
                    debug!("external cache allowed");
                    session.allow_external_cache = true;
                }
            }
            Command::SetQualityBar | Command::SetQualityBarTooltip => {}
            Command::GetPin => return flows::get_pin(session, &self.presenter, &self.gate).await,
            Command::Confirm => return flows::confirm(session, &self.presenter).await,
            Command::Message => return flows::message(session, &self.presenter, args).await,
            Command::GetInfo => return self.host.answer(args.trim()),
            Command::Bye => {}
            Command::Unknown(token) => debug!(%token, "ignoring unknown command"),
        }

        Response::Ok
    }
}

fn or_default(text: String, default: &str) -> String {
    if text.is_empty() {
        default.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::InputOutcome;
    use crate::secret::Credential;
    use crate::testing::{FakePresenter, FixedGate, MemoryCache};
    use std::time::{Duration, Instant};

    struct Harness {
        presenter: Arc<FakePresenter>,
        cache: Arc<MemoryCache>,
        gate: Arc<FixedGate>,
        dispatcher: Dispatcher,
    }

    fn harness(presenter: FakePresenter, cache: MemoryCache, gate: FixedGate) -> Harness {
        let presenter = Arc::new(presenter);
        let cache = Arc::new(cache);
        let gate = Arc::new(gate);
        let dispatcher = Dispatcher::new(presenter.clone(), cache.clone(), gate.clone())
            .with_host_info(HostInfo::default().with_tty_name("/dev/pts/3"));
        Harness {
            presenter,
            cache,
            gate,
            dispatcher,
        }
    }

    fn default_harness() -> Harness {
        harness(FakePresenter::new(), MemoryCache::new(), FixedGate::allow())
    }

    #[tokio::test]
    async fn test_blank_and_comment_lines() {
        let mut h = default_harness();
        assert_eq!(h.dispatcher.handle("").await, None);
        assert_eq!(h.dispatcher.handle("   ").await, None);
        assert_eq!(h.dispatcher.handle("# comment").await, None);
    }

    #[tokio::test]
    async fn test_setters() {
        let mut h = default_harness();
        for line in [
            "SETDESC Unlock%20key",
            "setprompt PIN:",
            "SETTITLE Agent",
            "SETNOTOK Deny",
            "SETREPEAT Again%3A",
            "SETREPEATERROR Mismatch",
            "SETTIMEOUT 15",
            "SETQUALITYBAR",
            "SETQUALITYBAR_TT weak",
        ] {
            assert_eq!(h.dispatcher.handle(line).await.as_deref(), Some("OK"));
        }

        let session = h.dispatcher.session();
        assert_eq!(session.description, "Unlock key");
        assert_eq!(session.prompt, "PIN:");
        assert_eq!(session.window_title, "Agent");
        assert_eq!(session.not_ok_text.as_deref(), Some("Deny"));
        assert_eq!(session.repeat_prompt.as_deref(), Some("Again:"));
        assert_eq!(session.repeat_error, "Mismatch");
        assert_eq!(session.timeout_seconds, 15);
    }

    #[tokio::test]
    async fn test_set_error_ignores_argument() {
        let mut h = default_harness();
        h.dispatcher.handle("SETERROR Bad%20PIN").await;
        assert_eq!(
            h.dispatcher.session().error_text.as_deref(),
            Some(INCORRECT_PASSPHRASE)
        );
    }

    #[tokio::test]
    async fn test_button_labels_fall_back() {
        let mut h = default_harness();
        h.dispatcher.handle("SETOK Unlock").await;
        h.dispatcher.handle("SETCANCEL Abort").await;
        assert_eq!(h.dispatcher.session().ok_text, "Unlock");
        assert_eq!(h.dispatcher.session().cancel_text, "Abort");

        h.dispatcher.handle("SETOK").await;
        h.dispatcher.handle("SETCANCEL").await;
        assert_eq!(h.dispatcher.session().ok_text, "OK");
        assert_eq!(h.dispatcher.session().cancel_text, "Cancel");
    }

    #[tokio::test]
    async fn test_set_timeout_non_numeric() {
        let mut h = default_harness();
        h.dispatcher.handle("SETTIMEOUT 30").await;
        h.dispatcher.handle("SETTIMEOUT soon").await;
        assert_eq!(h.dispatcher.session().timeout_seconds, 0);
    }

    #[tokio::test]
    async fn test_set_key_info() {
        let mut h = default_harness();
        h.dispatcher.handle("SETKEYINFO n/ABCDEF0123456789").await;
        assert_eq!(h.dispatcher.session().key_info(), "ABCDEF0123456789");

        h.dispatcher.handle("SETKEYINFO ABCDEF").await;
        assert_eq!(h.dispatcher.session().key_info(), "ABCDEF");
    }

    #[tokio::test]
    async fn test_set_key_info_uses_raw_argument() {
        let mut h = default_harness();
        h.dispatcher.handle("SETKEYINFO n/AB%2FCD").await;
        assert_eq!(h.dispatcher.session().key_info(), "AB%2FCD");
    }

    #[tokio::test]
    async fn test_set_desc_generates_label() {
        let mut h = default_harness();
        h.dispatcher
            .handle("SETDESC Please enter passphrase for \"Alice Example\" ID: 0xABCDEF0123456789")
            .await;
        assert_eq!(
            h.dispatcher.session().generated_label(),
            Some("Alice Example (ABCDEF0123456789)")
        );
    }

    #[tokio::test]
    async fn test_option() {
        let mut h = default_harness();
        assert_eq!(h.dispatcher.handle("OPTION ttytype=xterm").await.as_deref(), Some("OK"));
        assert!(!h.dispatcher.session().allow_external_cache);

        h.dispatcher.handle("OPTION allow-external-password-cache").await;
        assert!(h.dispatcher.session().allow_external_cache);

        h.dispatcher.handle("OPTION no-grab").await;
        assert!(h.dispatcher.session().allow_external_cache);
    }

    #[tokio::test]
    async fn test_bye_and_unknown() {
        let mut h = default_harness();
        assert_eq!(h.dispatcher.handle("BYE").await.as_deref(), Some("OK"));
        assert_eq!(h.dispatcher.handle("FROBNICATE x").await.as_deref(), Some("OK"));
    }

    #[tokio::test]
    async fn test_getinfo() {
        let mut h = default_harness();
        let pid = h.dispatcher.handle("GETINFO pid").await;
        assert_eq!(h.dispatcher.handle("GETINFO").await, pid);
        assert_eq!(pid, Some(format!("D {}\nOK", std::process::id())));

        assert_eq!(
            h.dispatcher.handle("GETINFO tty_name").await.as_deref(),
            Some("D %2Fdev%2Fpts%2F3\nOK")
        );
        assert_eq!(
            h.dispatcher.handle("GETINFO flavor").await.as_deref(),
            Some("D keypin\nOK")
        );
        assert_eq!(
            h.dispatcher.handle("GETINFO bogus").await.as_deref(),
            Some("ERR 83886361 Not supported")
        );
    }

    #[tokio::test]
    async fn test_get_pin_prompts() {
        let mut h = harness(
            FakePresenter::new().with_input(InputOutcome::entered(Credential::new("hunter2"), false)),
            MemoryCache::new(),
            FixedGate::allow(),
        );
        assert_eq!(
            h.dispatcher.handle("GETPIN").await.as_deref(),
            Some("D hunter2\nOK")
        );
        assert_eq!(h.presenter.input_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_get_pin_cancelled() {
        let mut h = default_harness();
        assert_eq!(
            h.dispatcher.handle("GETPIN").await.as_deref(),
            Some("ERR 83886179 Operation cancelled")
        );
    }

    #[tokio::test]
    async fn test_cache_not_consulted_without_option() {
        let mut h = harness(
            FakePresenter::new(),
            MemoryCache::new().with_entry("K1", "cached"),
            FixedGate::allow(),
        );
        h.dispatcher.handle("SETKEYINFO n/K1").await;
        h.dispatcher.handle("GETPIN").await;

        assert_eq!(h.cache.lookup_count(), 0);
        assert_eq!(h.gate.call_count(), 0);
        assert_eq!(h.presenter.input_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_silent_path() {
        let mut h = harness(
            FakePresenter::new(),
            MemoryCache::new().with_entry("K1", "cached pw"),
            FixedGate::allow(),
        );
        h.dispatcher.handle("OPTION allow-external-password-cache").await;
        h.dispatcher.handle("SETKEYINFO n/K1").await;
        h.dispatcher.handle("SETTITLE Unlock").await;

        assert_eq!(
            h.dispatcher.handle("GETPIN").await.as_deref(),
            Some("D cached%20pw\nOK")
        );
        assert!(h.presenter.input_requests().is_empty());
        assert_eq!(h.gate.last_reason().as_deref(), Some("Unlock"));
    }

    #[tokio::test]
    async fn test_biometric_reason_override() {
        let h = harness(
            FakePresenter::new(),
            MemoryCache::new().with_entry("default", "pw"),
            FixedGate::allow(),
        );
        let gate = h.gate.clone();
        let mut dispatcher = h.dispatcher.with_biometric_reason("use your key");
        dispatcher.handle("OPTION allow-external-password-cache").await;
        dispatcher.handle("GETPIN").await;
        assert_eq!(gate.last_reason().as_deref(), Some("use your key"));
    }

    #[tokio::test]
    async fn test_repeat_skips_silent_path() {
        let mut h = harness(
            FakePresenter::new().with_input(InputOutcome::entered(Credential::new("new"), false)),
            MemoryCache::new().with_entry("K1", "cached"),
            FixedGate::allow(),
        );
        h.dispatcher.handle("OPTION allow-external-password-cache").await;
        h.dispatcher.handle("SETKEYINFO n/K1").await;
        h.dispatcher.handle("SETREPEAT Again:").await;

        assert_eq!(
            h.dispatcher.handle("GETPIN").await.as_deref(),
            Some("D new\nOK")
        );
        assert_eq!(h.cache.lookup_count(), 0);
        assert_eq!(h.gate.call_count(), 0);
    }

    #[tokio::test]
    async fn test_biometric_decline_falls_through() {
        let mut h = harness(
            FakePresenter::new().with_input(InputOutcome::entered(Credential::new("typed"), false)),
            MemoryCache::new().with_entry("default", "cached"),
            FixedGate::deny(),
        );
        h.dispatcher.handle("OPTION allow-external-password-cache").await;

        assert_eq!(
            h.dispatcher.handle("GETPIN").await.as_deref(),
            Some("D typed\nOK")
        );
        assert_eq!(h.gate.call_count(), 1);
    }

    #[tokio::test]
    async fn test_cache_failure_falls_through() {
        let mut h = harness(
            FakePresenter::new().with_input(InputOutcome::entered(Credential::new("typed"), true)),
            MemoryCache::failing(),
            FixedGate::allow(),
        );
        h.dispatcher.handle("OPTION allow-external-password-cache").await;

        assert_eq!(
            h.dispatcher.handle("GETPIN").await.as_deref(),
            Some("D typed\nOK")
        );
        assert_eq!(h.cache.store_count(), 1);
    }

    #[tokio::test]
    async fn test_save_stores_with_label() {
        let mut h = harness(
            FakePresenter::new().with_input(InputOutcome::entered(Credential::new("pw"), true)),
            MemoryCache::new(),
            FixedGate::allow(),
        );
        h.dispatcher.handle("OPTION allow-external-password-cache").await;
        h.dispatcher.handle("SETKEYINFO n/K9").await;
        h.dispatcher.handle("SETDESC key ID DEADBEEF").await;
        h.dispatcher.handle("GETPIN").await;

        assert_eq!(h.cache.get("K9"), Some(Credential::new("pw")));
        assert_eq!(h.cache.label("K9").as_deref(), Some("GPG ID DEADBEEF"));
    }

    #[tokio::test]
    async fn test_save_ignored_without_option() {
        let mut h = harness(
            FakePresenter::new().with_input(InputOutcome::entered(Credential::new("pw"), true)),
            MemoryCache::new(),
            FixedGate::allow(),
        );
        h.dispatcher.handle("GETPIN").await;
        assert_eq!(h.cache.store_count(), 0);
    }

    #[tokio::test]
    async fn test_get_pin_resets_transient_fields() {
        let mut h = harness(
            FakePresenter::new().with_input(InputOutcome::entered(Credential::new("pw"), false)),
            MemoryCache::new(),
            FixedGate::allow(),
        );
        for line in [
            "OPTION allow-external-password-cache",
            "SETKEYINFO n/K1",
            "SETERROR",
            "SETNOTOK No",
            "SETREPEAT Again",
            "SETTIMEOUT 30",
        ] {
            h.dispatcher.handle(line).await;
        }

        h.dispatcher.handle("GETPIN").await;
        let session = h.dispatcher.session();
        assert!(session.error_text.is_none());
        assert!(session.not_ok_text.is_none());
        assert!(session.repeat_prompt.is_none());
        assert_eq!(session.timeout_seconds, 0);
        assert!(session.allow_external_cache);
        assert_eq!(session.key_info(), "K1");

        // the second GETPIN is cancelled; reset applies as well
        h.dispatcher.handle("SETERROR").await;
        h.dispatcher.handle("SETTIMEOUT 30").await;
        h.dispatcher.handle("GETPIN").await;
        assert!(h.dispatcher.session().error_text.is_none());
        assert_eq!(h.dispatcher.session().timeout_seconds, 0);
    }

    #[tokio::test]
    async fn test_default_timeout_restored() {
        let mut dispatcher = default_harness().dispatcher.with_default_timeout(45);
        assert_eq!(dispatcher.session().timeout_seconds, 45);

        dispatcher.handle("SETTIMEOUT 5").await;
        dispatcher.handle("GETPIN").await;
        assert_eq!(dispatcher.session().timeout_seconds, 45);
    }

    #[tokio::test]
    async fn test_timeout_cancels_prompt() {
        let mut h = harness(FakePresenter::silent(), MemoryCache::new(), FixedGate::allow());
        h.dispatcher.handle("SETTIMEOUT 1").await;

        let started = Instant::now();
        let response = h.dispatcher.handle("GETPIN").await;
        let elapsed = started.elapsed();

        assert_eq!(response.as_deref(), Some("ERR 83886179 Operation cancelled"));
        assert!(elapsed >= Duration::from_millis(900));
        assert!(elapsed < Duration::from_secs(2));
        assert_eq!(h.presenter.force_close_count(), 1);
    }

    #[tokio::test]
    async fn test_answer_before_timeout_cancels_it() {
        let mut h = harness(
            FakePresenter::new()
                .with_input(InputOutcome::entered(Credential::new("quick"), false))
                .with_delay(Duration::from_millis(10)),
            MemoryCache::new(),
            FixedGate::allow(),
        );
        h.dispatcher.handle("SETTIMEOUT 1").await;
        assert_eq!(
            h.dispatcher.handle("GETPIN").await.as_deref(),
            Some("D quick\nOK")
        );

        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert_eq!(h.presenter.force_close_count(), 0);
    }

    #[tokio::test]
    async fn test_confirm_and_message() {
        let mut h = harness(
            FakePresenter::new().with_confirm(true),
            MemoryCache::new(),
            FixedGate::allow(),
        );
        h.dispatcher.handle("SETNOTOK Never").await;
        assert_eq!(h.dispatcher.handle("CONFIRM").await.as_deref(), Some("OK"));
        assert!(h.dispatcher.session().not_ok_text.is_none());

        assert_eq!(
            h.dispatcher.handle("CONFIRM").await.as_deref(),
            Some("ERR 114 Operation cancelled")
        );

        assert_eq!(
            h.dispatcher.handle("MESSAGE Key%20created").await.as_deref(),
            Some("OK")
        );
        assert_eq!(h.presenter.message_requests()[0].description, "Key created");
    }
}
