//! Cancellable prompt timeout.

use crate::ports::{Completion, Presenter};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// A scheduled force-close racing the user's answer.
///
/// When the delay elapses before the request completes, the controller
/// closes the presenter and completes the request with the cancellation
/// value. Cancelling (or dropping) the controller aborts the scheduled task.
#[derive(Debug, Default)]
pub struct TimeoutController {
    handle: Option<JoinHandle<()>>,
}

impl TimeoutController {
    /// A controller that never fires.
    pub fn disarmed() -> Self {
        Self::default()
    }

    /// Schedule the timeout. `seconds == 0` means no timeout.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<T>(
        seconds: u64,
        presenter: Arc<dyn Presenter>,
        done: Completion<T>,
        on_timeout: T,
    ) -> Self
    where
        T: Send + 'static,
    {
        if seconds == 0 {
            return Self::disarmed();
        }

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(seconds)).await;
            if done.is_done() {
                return;
            }
            debug!(seconds, "prompt timed out, closing presenter");
            presenter.force_close();
            done.complete(on_timeout);
        });

        Self {
            handle: Some(handle),
        }
    }

    /// Abort the scheduled task if it has not fired yet.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for TimeoutController {
    fn drop(&mut self) {
        self.cancel();
    }
}
