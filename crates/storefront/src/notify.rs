//! Change notification for the owned stores.
//!
//! Each store carries a [`ChangeNotifier`] and bumps it after every
//! effective mutation. A UI layer subscribes with [`ChangeNotifier::watch`]
//! and re-reads the store when the revision moves; the engine never calls
//! into the rendering side.

use tokio::sync::watch;

/// Monotonic revision counter backed by a `tokio::sync::watch` channel.
#[derive(Debug)]
pub struct ChangeNotifier {
    tx: watch::Sender<u64>,
}

impl ChangeNotifier {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx }
    }

    /// Current revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Bump the revision, waking all subscribers.
    pub fn notify(&self) {
        self.tx.send_modify(|rev| *rev += 1);
    }

    /// Subscribe to revision changes.
    ///
    /// The receiver starts marked unseen only for revisions bumped after
    /// this call.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
