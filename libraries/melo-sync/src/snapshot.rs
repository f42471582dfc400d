//! Closable view publisher shared by the reducers

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// Watch sender that stops accepting snapshots once closed
///
/// A reducer may still be mid-update on another worker when its owner closes
/// it; its late publish is refused so the cleared view stays cleared.
pub(crate) struct SnapshotPublisher<T> {
    tx: watch::Sender<T>,
    closed: AtomicBool,
}

impl<T> SnapshotPublisher<T> {
    pub(crate) fn new(initial: T) -> (Self, watch::Receiver<T>) {
        let (tx, rx) = watch::channel(initial);
        (
            Self {
                tx,
                closed: AtomicBool::new(false),
            },
            rx,
        )
    }

    /// Replace the view; returns `false` once closed
    pub(crate) fn publish(&self, value: T) -> bool {
        // The flag is read under the channel's write lock, so a publish can
        // never land after `close` has swapped in the empty view
        self.tx.send_if_modified(|current| {
            if self.closed.load(Ordering::SeqCst) {
                return false;
            }
            *current = value;
            true
        })
    }

    /// Refuse further publishes and swap in `empty`
    pub(crate) fn close(&self, empty: T) {
        self.closed.store(true, Ordering::SeqCst);
        self.tx.send_replace(empty);
    }
}
