// Queue Service - transactional queue operations

pub mod dequeue;
pub mod enqueue;

pub use enqueue::{EnqueueRequest, MAX_TEXT_BYTES};

use crate::application::manager::WorkSignal;
use crate::domain::{Item, ItemId};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, TimeProvider, TransactionalItemStore};
use std::sync::Arc;
use tracing::info;

/// Queue Service
///
/// Safe to share between any number of producers. Only the queue manager's
/// consumer is expected to call `dequeue` in normal operation.
pub struct QueueService {
    store: Arc<dyn TransactionalItemStore>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    signal: WorkSignal,
}

impl QueueService {
    pub fn new(
        store: Arc<dyn TransactionalItemStore>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            store,
            id_provider,
            time_provider,
            signal: WorkSignal::new(),
        }
    }

    /// Signal raised after every committed enqueue
    pub fn work_signal(&self) -> WorkSignal {
        self.signal.clone()
    }

    /// Enqueue a new item
    pub async fn enqueue(&self, req: EnqueueRequest) -> Result<Item> {
        enqueue::execute(
            self.store.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            &self.signal,
            req,
        )
        .await
    }

    /// Remove and return the oldest item
    ///
    /// # Errors
    /// - AppError::NotFound if the queue is empty
    pub async fn dequeue(&self) -> Result<Item> {
        dequeue::execute(self.store.as_ref()).await
    }

    /// Look up an item without removing it
    pub async fn get_by_id(&self, id: &ItemId) -> Result<Item> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with ID {} not found", id)))
    }

    /// Current number of queued items
    pub async fn size(&self) -> Result<u64> {
        self.store.count().await
    }

    /// Remove every item. Does not wake the consumer.
    pub async fn clear(&self) -> Result<()> {
        let mut tx = self.store.begin_transaction().await?;
        let removed = match tx.delete_all().await {
            Ok(n) => n,
            Err(e) => {
                tx.rollback().await?;
                return Err(e);
            }
        };
        tx.commit().await?;

        info!(removed = removed, "Queue cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::item_store::mocks::InMemoryItemStore;
    use crate::port::time_provider::mocks::ManualTimeProvider;

    fn service_with_clock() -> (QueueService, InMemoryItemStore, Arc<ManualTimeProvider>) {
        let store = InMemoryItemStore::new();
        let clock = Arc::new(ManualTimeProvider::new(1_000));
        let service = QueueService::new(
            Arc::new(store.clone()),
            Arc::new(SequentialIdProvider::new("item")),
            clock.clone(),
        );
        (service, store, clock)
    }

    fn req(text: &str, cost: u32) -> EnqueueRequest {
        EnqueueRequest {
            text: text.to_string(),
            cost,
        }
    }

    #[tokio::test]
    async fn test_dequeue_in_arrival_order() {
        let (service, _, clock) = service_with_clock();

        let a = service.enqueue(req("A", 100)).await.unwrap();
        clock.advance(1);
        let b = service.enqueue(req("B", 50)).await.unwrap();

        assert_eq!(service.dequeue().await.unwrap(), a);
        assert_eq!(service.dequeue().await.unwrap(), b);
        assert!(service.dequeue().await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_identical_timestamps_keep_insertion_order() {
        let (service, _, _) = service_with_clock();

        // Clock never advances: every item shares one timestamp
        let mut expected = Vec::new();
        for i in 0..5 {
            expected.push(service.enqueue(req(&format!("t{}", i), 0)).await.unwrap().id);
        }

        let mut seen = Vec::new();
        while let Ok(item) = service.dequeue().await {
            seen.push(item.id);
        }
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_dequeue_empty_is_not_found() {
        let (service, _, _) = service_with_clock();

        let err = service.dequeue().await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Queue is empty"));
    }

    #[tokio::test]
    async fn test_get_by_id_round_trip() {
        let (service, _, _) = service_with_clock();

        let item = service.enqueue(req("hello", 42)).await.unwrap();
        let found = service.get_by_id(&item.id).await.unwrap();

        assert_eq!(found.id, item.id);
        assert_eq!(found.text, "hello");
        assert_eq!(found.cost, 42);
        assert_eq!(found.enqueued_at, 1_000);

        // Lookup does not consume
        assert_eq!(service.size().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_by_unknown_id() {
        let (service, _, _) = service_with_clock();

        let err = service.get_by_id(&"missing".to_string()).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("missing"));
    }

    #[tokio::test]
    async fn test_size_and_clear() {
        let (service, _, _) = service_with_clock();

        service.enqueue(req("X", 10)).await.unwrap();
        assert_eq!(service.size().await.unwrap(), 1);

        service.clear().await.unwrap();
        assert_eq!(service.size().await.unwrap(), 0);
        assert!(service.dequeue().await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_clear_on_empty_is_noop() {
        let (service, _, _) = service_with_clock();

        service.clear().await.unwrap();
        service.clear().await.unwrap();
        assert_eq!(service.size().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_dequeue_storage_error_is_not_not_found() {
        let (service, store, _) = service_with_clock();
        service.enqueue(req("A", 0)).await.unwrap();

        store.fail_next_dequeues(1);
        let err = service.dequeue().await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        // Item survived the failed attempt
        assert_eq!(service.dequeue().await.unwrap().text, "A");
    }
}
