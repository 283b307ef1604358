//! Single-use rendezvous between the protocol task and whoever completes an
//! interaction (the presenter or the timeout).
//!
//! Any number of [`Signal`] clones may race to deliver a value; only the
//! first one gets through. Later attempts report `false` and drop their
//! value. The waiting side sees `None` if every signal handle is dropped
//! without delivering.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Create a connected signal/wait pair.
pub fn rendezvous<T>() -> (Signal<T>, Rendezvous<T>) {
    let (tx, rx) = oneshot::channel();
    let signal = Signal {
        slot: Arc::new(Mutex::new(Some(tx))),
    };
    (signal, Rendezvous { rx })
}

/// Producer half. Cloneable; delivers at most once across all clones.
pub struct Signal<T> {
    slot: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Signal<T> {
    /// Deliver `value`. Returns `true` only for the delivery that won.
    pub fn signal(&self, value: T) -> bool {
        let sender = self.slot.lock().take();
        match sender {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }

    /// Whether some clone already delivered (or the waiter went away).
    pub fn is_spent(&self) -> bool {
        match self.slot.lock().as_ref() {
            Some(tx) => tx.is_closed(),
            None => true,
        }
    }
}

impl<T> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("spent", &self.is_spent())
            .finish()
    }
}

/// Consumer half.
#[derive(Debug)]
pub struct Rendezvous<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Rendezvous<T> {
    /// Wait for the winning value.
    pub async fn wait(self) -> Option<T> {
        self.rx.await.ok()
    }
}
