// Item Domain Model

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Item ID (UUID v4)
pub type ItemId = String;

/// Simulated processing cost in milliseconds
pub type Cost = u32;

/// A unit of queued work.
///
/// Items are immutable once created. `enqueued_at` (epoch ms) is the only
/// ordering key; the store breaks ties by insertion sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub text: String,
    pub cost: Cost,
    pub enqueued_at: i64, // epoch ms
}

impl Item {
    /// Create a new Item
    ///
    /// # Arguments
    ///
    /// * `id` - Unique item ID (injected, not generated)
    /// * `enqueued_at` - Arrival timestamp in epoch ms (injected, not system time)
    /// * `text` - Opaque payload
    /// * `cost` - Simulated work in milliseconds
    pub fn new(id: impl Into<String>, enqueued_at: i64, text: impl Into<String>, cost: Cost) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            cost,
            enqueued_at,
        }
    }

    /// Create a test item with deterministic ID and timestamp.
    ///
    /// Uses a process-wide counter (test-1, test-2, ...). Timestamps start at
    /// 1000 and increment by 1000, so successive calls are strictly ordered.
    ///
    /// **Note**: production code injects ID and time via providers.
    pub fn new_test(text: impl Into<String>, cost: Cost) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        Self::new(
            format!("test-{}", counter),
            (counter * 1000) as i64,
            text,
            cost,
        )
    }

    /// How long the processor should spend on this item
    pub fn cost_duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.cost))
    }

    /// Milliseconds spent in the queue as of `now_millis`
    pub fn age_millis(&self, now_millis: i64) -> i64 {
        now_millis.saturating_sub(self.enqueued_at).max(0)
    }
}
