// Work Signal - wakes the consumer when an enqueue commits

use std::sync::Arc;
use tokio::sync::futures::Notified;
use tokio::sync::Notify;
use tracing::debug;

/// Wakeup channel between producers and the single consumer.
///
/// Backed by [`Notify`]: a notification sent while nobody waits is kept as a
/// permit, and any number of notifications before the next wait collapse
/// into one. The consumer re-checks the store after every wakeup, so one
/// permit is enough.
#[derive(Clone, Default)]
pub struct WorkSignal {
    notify: Arc<Notify>,
}

impl WorkSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// ItemEnqueued: called once per committed enqueue
    pub fn notify_enqueued(&self, item_id: &str) {
        debug!(item_id = %item_id, "ItemEnqueued, waking consumer");
        self.notify.notify_one();
    }

    /// Future that resolves on the next notification.
    ///
    /// To avoid losing a wakeup, pin and `enable()` it before checking the
    /// store, then await it only if the store was empty.
    pub fn notified(&self) -> Notified<'_> {
        self.notify.notified()
    }
}
