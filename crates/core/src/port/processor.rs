// Processor Port
// Abstraction for the work performed on each dequeued item

use crate::domain::{Item, ItemId};
use async_trait::async_trait;
use thiserror::Error;

/// Processing errors
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Processing failed for item {item_id}: {reason}")]
    Failed { item_id: ItemId, reason: String },

    #[error("Processing interrupted for item {0}")]
    Interrupted(ItemId),
}

/// Processor trait
///
/// Implementations:
/// - DelayProcessor: sleeps for the item's cost (reference workload)
///
/// The consumer may drop the returned future at any await point when a
/// shutdown is requested, so implementations must not leave shared state
/// half-updated across an await.
#[async_trait]
pub trait Processor: Send + Sync {
    /// Process a single item
    ///
    /// # Errors
    /// - ProcessError::Failed if the workload reports a failure
    async fn process(&self, item: &Item) -> Result<(), ProcessError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::watch;

    /// Mock processor behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Sleep for the item's cost, then succeed
        Success,
        /// Fail with message
        Fail(String),
        /// Panic with message (for panic isolation testing)
        Panic(String),
    }

    /// Processor that records what it saw.
    ///
    /// Behavior can be overridden per item text. `calls` counts every
    /// invocation (including ones that later fail, panic or get interrupted).
    pub struct RecordingProcessor {
        default: MockBehavior,
        overrides: HashMap<String, MockBehavior>,
        completed: Mutex<Vec<Item>>,
        calls: watch::Sender<usize>,
    }

    impl Default for RecordingProcessor {
        fn default() -> Self {
            Self::new(MockBehavior::Success)
        }
    }

    impl RecordingProcessor {
        pub fn new(default: MockBehavior) -> Self {
            let (calls, _) = watch::channel(0);
            Self {
                default,
                overrides: HashMap::new(),
                completed: Mutex::new(Vec::new()),
                calls,
            }
        }

        pub fn new_success() -> Self {
            Self::default()
        }

        /// Use `behavior` for items whose text equals `text`
        pub fn with_override(mut self, text: impl Into<String>, behavior: MockBehavior) -> Self {
            self.overrides.insert(text.into(), behavior);
            self
        }

        /// Items that finished successfully, in processing order
        pub fn completed(&self) -> Vec<Item> {
            self.completed.lock().unwrap().clone()
        }

        pub fn completed_ids(&self) -> Vec<ItemId> {
            self.completed().into_iter().map(|item| item.id).collect()
        }

        pub fn call_count(&self) -> usize {
            *self.calls.borrow()
        }

        /// Wait until at least `count` calls have started, or `timeout` elapses.
        /// Returns whether the count was reached.
        pub async fn wait_for_calls(&self, count: usize, timeout: Duration) -> bool {
            let mut rx = self.calls.subscribe();
            tokio::time::timeout(timeout, rx.wait_for(|calls| *calls >= count))
                .await
                .map(|res| res.is_ok())
                .unwrap_or(false)
        }

        /// Wait until at least `count` items completed, or `timeout` elapses.
        pub async fn wait_for_completed(&self, count: usize, timeout: Duration) -> bool {
            let deadline = tokio::time::Instant::now() + timeout;
            loop {
                if self.completed.lock().unwrap().len() >= count {
                    return true;
                }
                if tokio::time::Instant::now() >= deadline {
                    return false;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        }
    }

    #[async_trait]
    impl Processor for RecordingProcessor {
        async fn process(&self, item: &Item) -> Result<(), ProcessError> {
            self.calls.send_modify(|calls| *calls += 1);

            let behavior = self
                .overrides
                .get(&item.text)
                .unwrap_or(&self.default)
                .clone();

            match behavior {
                MockBehavior::Success => {
                    tokio::time::sleep(item.cost_duration()).await;
                    self.completed.lock().unwrap().push(item.clone());
                    Ok(())
                }
                MockBehavior::Fail(reason) => Err(ProcessError::Failed {
                    item_id: item.id.clone(),
                    reason,
                }),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
            }
        }
    }
}
