//! The terminal presenter.
//!
//! Dialogs run one at a time on a dedicated presentation thread fed by a job
//! queue. `force_close` completes the request in progress with a
//! cancellation right away; a terminal read already blocked in the thread
//! finishes when the user presses Enter and its answer is discarded.

use crate::prompt;
use crate::tty::{DevTty, Terminal};
use keypin_core::{
    Completion, ConfirmRequest, InputOutcome, InputRequest, MessageRequest, Presenter,
};
use parking_lot::Mutex;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

type TerminalFactory = Box<dyn Fn() -> io::Result<Box<dyn Terminal>> + Send>;

enum Dialog {
    Input(InputRequest, Completion<InputOutcome>),
    Confirm(ConfirmRequest, Completion<bool>),
    Message(MessageRequest, Completion<()>),
}

/// Completion of the request in progress, kept for `force_close`.
enum Pending {
    Input(Completion<InputOutcome>),
    Confirm(Completion<bool>),
    Message(Completion<()>),
}

impl Pending {
    fn cancel(self) {
        match self {
            Self::Input(done) => done.complete(InputOutcome::cancelled()),
            Self::Confirm(done) => done.complete(false),
            Self::Message(done) => done.complete(()),
        };
    }
}

struct Job {
    id: u64,
    dialog: Dialog,
}

impl Dialog {
    fn is_done(&self) -> bool {
        match self {
            Self::Input(_, done) => done.is_done(),
            Self::Confirm(_, done) => done.is_done(),
            Self::Message(_, done) => done.is_done(),
        }
    }

    fn run(self, term: &mut dyn Terminal) {
        match self {
            Self::Input(request, done) => {
                let outcome = prompt::ask_input(term, &request).unwrap_or_else(|e| {
                    warn!("terminal input failed: {e}");
                    InputOutcome::cancelled()
                });
                done.complete(outcome);
            }
            Self::Confirm(request, done) => {
                let confirmed = prompt::ask_confirm(term, &request).unwrap_or_else(|e| {
                    warn!("terminal confirmation failed: {e}");
                    false
                });
                done.complete(confirmed);
            }
            Self::Message(request, done) => {
                if let Err(e) = prompt::show_message(term, &request) {
                    warn!("terminal message failed: {e}");
                }
                done.complete(());
            }
        }
    }

    fn abandon(self) {
        let pending = match self {
            Self::Input(_, done) => Pending::Input(done),
            Self::Confirm(_, done) => Pending::Confirm(done),
            Self::Message(_, done) => Pending::Message(done),
        };
        pending.cancel();
    }
}

/// Presenter talking to the controlling terminal.
pub struct TerminalPresenter {
    jobs: mpsc::Sender<Job>,
    pending: Arc<Mutex<Option<(u64, Pending)>>>,
    next_id: AtomicU64,
}

impl TerminalPresenter {
    /// Start the presentation thread on the controlling terminal.
    pub fn spawn() -> io::Result<Self> {
        Self::spawn_with(Box::new(|| {
            DevTty::open().map(|tty| Box::new(tty) as Box<dyn Terminal>)
        }))
    }

    /// Start the presentation thread; every dialog opens a fresh terminal
    /// from `open`.
    pub(crate) fn spawn_with(open: TerminalFactory) -> io::Result<Self> {
        let (jobs, queue) = mpsc::channel::<Job>();
        let pending: Arc<Mutex<Option<(u64, Pending)>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&pending);

        thread::Builder::new()
            .name("keypin-presenter".to_string())
            .spawn(move || {
                for Job { id, dialog } in queue {
                    if dialog.is_done() {
                        debug!(id, "dialog closed before it was shown");
                    } else {
                        match open() {
                            Ok(mut term) => dialog.run(term.as_mut()),
                            Err(e) => {
                                warn!("cannot open terminal: {e}");
                                dialog.abandon();
                            }
                        }
                    }

                    let mut slot = slot.lock();
                    if slot.as_ref().is_some_and(|(current, _)| *current == id) {
                        slot.take();
                    }
                }
                debug!("presentation thread stopped");
            })?;

        Ok(Self {
            jobs,
            pending,
            next_id: AtomicU64::new(0),
        })
    }

    fn submit(&self, dialog: Dialog, pending: Pending) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        *self.pending.lock() = Some((id, pending));

        if let Err(mpsc::SendError(job)) = self.jobs.send(Job { id, dialog }) {
            warn!("presentation thread is gone");
            self.pending.lock().take();
            job.dialog.abandon();
        }
    }
}

impl Presenter for TerminalPresenter {
    fn request_input(&self, request: InputRequest, done: Completion<InputOutcome>) {
        let pending = Pending::Input(done.clone());
        self.submit(Dialog::Input(request, done), pending);
    }

    fn request_confirm(&self, request: ConfirmRequest, done: Completion<bool>) {
        let pending = Pending::Confirm(done.clone());
        self.submit(Dialog::Confirm(request, done), pending);
    }

    fn request_message(&self, request: MessageRequest, done: Completion<()>) {
        let pending = Pending::Message(done.clone());
        self.submit(Dialog::Message(request, done), pending);
    }

    fn force_close(&self) {
        if let Some((id, pending)) = self.pending.lock().take() {
            debug!(id, "force-closing dialog");
            pending.cancel();
        }
    }
}
