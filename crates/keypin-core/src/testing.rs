//! In-memory collaborators for tests.
//!
//! These are used by the unit tests in this crate and by the integration
//! test crate; they are not meant for production wiring.

use crate::ports::{
    BiometricGate, CollaboratorError, Completion, ConfirmRequest, CredentialCache, InputOutcome,
    InputRequest, MessageRequest, PortResult, Presenter,
};
use crate::secret::Credential;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Scripted presenter.
///
/// Answers come from queues filled with [`FakePresenter::with_input`] and
/// [`FakePresenter::with_confirm`]; an empty queue answers with a
/// cancellation. A silent presenter never answers on its own and only
/// completes through [`Presenter::force_close`].
#[derive(Debug, Default)]
pub struct FakePresenter {
    inputs: Mutex<VecDeque<InputOutcome>>,
    confirms: Mutex<VecDeque<bool>>,
    silent: bool,
    delay: Option<Duration>,

    pending_input: Mutex<Option<Completion<InputOutcome>>>,
    pending_confirm: Mutex<Option<Completion<bool>>>,
    pending_message: Mutex<Option<Completion<()>>>,

    input_requests: Mutex<Vec<InputRequest>>,
    confirm_requests: Mutex<Vec<ConfirmRequest>>,
    message_requests: Mutex<Vec<MessageRequest>>,
    force_closes: AtomicUsize,
}

impl FakePresenter {
    /// Presenter that answers immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Presenter that never answers by itself.
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::default()
        }
    }

    /// Queue an answer for the next input request.
    pub fn with_input(self, outcome: InputOutcome) -> Self {
        self.inputs.lock().push_back(outcome);
        self
    }

    /// Queue an answer for the next confirmation.
    pub fn with_confirm(self, confirmed: bool) -> Self {
        self.confirms.lock().push_back(confirmed);
        self
    }

    /// Answer from a separate thread after `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Input requests received so far.
    pub fn input_requests(&self) -> Vec<InputRequest> {
        self.input_requests.lock().clone()
    }

    /// Confirmation requests received so far.
    pub fn confirm_requests(&self) -> Vec<ConfirmRequest> {
        self.confirm_requests.lock().clone()
    }

    /// Message requests received so far.
    pub fn message_requests(&self) -> Vec<MessageRequest> {
        self.message_requests.lock().clone()
    }

    /// Number of `force_close` calls.
    pub fn force_close_count(&self) -> usize {
        self.force_closes.load(Ordering::SeqCst)
    }

    fn answer<T: Send + 'static>(&self, done: Completion<T>, value: T) {
        match self.delay {
            Some(delay) => {
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    done.complete(value);
                });
            }
            None => {
                done.complete(value);
            }
        }
    }
}

impl Presenter for FakePresenter {
    fn request_input(&self, request: InputRequest, done: Completion<InputOutcome>) {
        self.input_requests.lock().push(request);
        if self.silent {
            *self.pending_input.lock() = Some(done);
            return;
        }
        let outcome = self
            .inputs
            .lock()
            .pop_front()
            .unwrap_or_else(InputOutcome::cancelled);
        self.answer(done, outcome);
    }

    fn request_confirm(&self, request: ConfirmRequest, done: Completion<bool>) {
        self.confirm_requests.lock().push(request);
        if self.silent {
            *self.pending_confirm.lock() = Some(done);
            return;
        }
        let confirmed = self.confirms.lock().pop_front().unwrap_or(false);
        self.answer(done, confirmed);
    }

    fn request_message(&self, request: MessageRequest, done: Completion<()>) {
        self.message_requests.lock().push(request);
        if self.silent {
            *self.pending_message.lock() = Some(done);
            return;
        }
        self.answer(done, ());
    }

    fn force_close(&self) {
        self.force_closes.fetch_add(1, Ordering::SeqCst);
        if let Some(done) = self.pending_input.lock().take() {
            done.complete(InputOutcome::cancelled());
        }
        if let Some(done) = self.pending_confirm.lock().take() {
            done.complete(false);
        }
        if let Some(done) = self.pending_message.lock().take() {
            done.complete(());
        }
    }
}

/// Cache backed by a `HashMap`, counting every call.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (Credential, Option<String>)>>,
    lookups: AtomicUsize,
    stores: AtomicUsize,
    failing: bool,
}

impl MemoryCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache whose every call fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Pre-populate an entry.
    pub fn with_entry(self, key: &str, credential: &str) -> Self {
        self.entries
            .lock()
            .insert(key.to_string(), (Credential::new(credential), None));
        self
    }

    /// Stored credential for `key`.
    pub fn get(&self, key: &str) -> Option<Credential> {
        self.entries.lock().get(key).map(|(c, _)| c.clone())
    }

    /// Stored label for `key`.
    pub fn label(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).and_then(|(_, l)| l.clone())
    }

    /// Number of `lookup` calls.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of `store` calls.
    pub fn store_count(&self) -> usize {
        self.stores.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialCache for MemoryCache {
    async fn lookup(&self, key: &str) -> PortResult<Option<Credential>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(CollaboratorError::Cache("lookup failed".to_string()));
        }
        Ok(self.get(key))
    }

    async fn store(
        &self,
        key: &str,
        credential: &Credential,
        label: Option<&str>,
    ) -> PortResult<()> {
        self.stores.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(CollaboratorError::Cache("store failed".to_string()));
        }
        self.entries.lock().insert(
            key.to_string(),
            (credential.clone(), label.map(str::to_string)),
        );
        Ok(())
    }
}

/// Biometric gate with a fixed answer.
#[derive(Debug)]
pub struct FixedGate {
    answer: Option<bool>,
    calls: AtomicUsize,
    last_reason: Mutex<Option<String>>,
}

impl FixedGate {
    /// Gate that always passes.
    pub fn allow() -> Self {
        Self::with_answer(Some(true))
    }

    /// Gate the user always declines.
    pub fn deny() -> Self {
        Self::with_answer(Some(false))
    }

    /// Gate that reports an error.
    pub fn failing() -> Self {
        Self::with_answer(None)
    }

    fn with_answer(answer: Option<bool>) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
            last_reason: Mutex::new(None),
        }
    }

    /// Number of `authenticate` calls.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Reason passed to the last call.
    pub fn last_reason(&self) -> Option<String> {
        self.last_reason.lock().clone()
    }
}

#[async_trait]
impl BiometricGate for FixedGate {
    async fn authenticate(&self, reason: &str) -> PortResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_reason.lock() = Some(reason.to_string());
        self.answer.ok_or_else(|| {
            CollaboratorError::BiometricsUnavailable("no sensor".to_string())
        })
    }
}
