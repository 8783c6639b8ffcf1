// Delay Processor - reference workload

use crate::domain::Item;
use crate::port::{ProcessError, Processor, TimeProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Logs each item and then sleeps for its cost.
///
/// The sleep is a plain tokio timer, so aborting the task ends it at once.
pub struct DelayProcessor {
    time_provider: Arc<dyn TimeProvider>,
}

impl DelayProcessor {
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self { time_provider }
    }
}

#[async_trait]
impl Processor for DelayProcessor {
    async fn process(&self, item: &Item) -> Result<(), ProcessError> {
        let age_ms = item.age_millis(self.time_provider.now_millis());
        info!(
            item_id = %item.id,
            enqueued_at = item.enqueued_at,
            age_ms = age_ms,
            cost_ms = item.cost,
            "Processing item"
        );

        tokio::time::sleep(item.cost_duration()).await;

        info!(item_id = %item.id, "Item processed");
        Ok(())
    }
}
