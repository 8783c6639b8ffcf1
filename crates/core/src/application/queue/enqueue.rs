// Enqueue Use Case

use crate::application::manager::WorkSignal;
use crate::domain::{Cost, DomainError, Item};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, TimeProvider, TransactionalItemStore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Largest accepted payload (1 MiB)
pub const MAX_TEXT_BYTES: usize = 1024 * 1024;

/// Enqueue request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueRequest {
    pub text: String,

    #[serde(default)]
    pub cost: Cost,
}

/// Reject payloads the store should never see
pub fn validate_request(req: &EnqueueRequest) -> std::result::Result<(), DomainError> {
    if req.text.len() > MAX_TEXT_BYTES {
        return Err(DomainError::ValidationError(format!(
            "text is {} bytes, limit is {}",
            req.text.len(),
            MAX_TEXT_BYTES
        )));
    }
    Ok(())
}

/// Execute enqueue use case
///
/// The consumer is signalled only after the insert has committed, so a
/// woken consumer always finds the item.
///
/// # Arguments
///
/// * `store` - Transactional item store
/// * `id_provider` - ID generator (injected for determinism)
/// * `time_provider` - Time provider (injected for determinism)
/// * `signal` - Wakeup signal shared with the consumer
/// * `req` - Enqueue request
///
/// # Errors
/// - AppError::Validation if the request is rejected before touching storage
/// - AppError::Enqueue if the insert or commit fails (nothing is signalled)
pub async fn execute(
    store: &dyn TransactionalItemStore,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    signal: &WorkSignal,
    req: EnqueueRequest,
) -> Result<Item> {
    validate_request(&req).map_err(|e| AppError::Validation(e.to_string()))?;

    let item = Item::new(
        id_provider.generate_id(),
        time_provider.now_millis(),
        req.text,
        req.cost,
    );

    let mut tx = store
        .begin_transaction()
        .await
        .map_err(|e| AppError::Enqueue(e.to_string()))?;

    if let Err(e) = tx.insert(&item).await {
        if let Err(rollback_err) = tx.rollback().await {
            warn!(item_id = %item.id, error = %rollback_err, "Rollback after failed insert failed");
        }
        return Err(AppError::Enqueue(e.to_string()));
    }

    tx.commit()
        .await
        .map_err(|e| AppError::Enqueue(e.to_string()))?;

    info!(item_id = %item.id, cost = item.cost, "Item enqueued");
    signal.notify_enqueued(&item.id);

    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::item_store::mocks::InMemoryItemStore;
    use crate::port::time_provider::mocks::ManualTimeProvider;
    use crate::port::ItemStore;
    use std::time::Duration;

    struct Fixture {
        store: InMemoryItemStore,
        ids: SequentialIdProvider,
        clock: ManualTimeProvider,
        signal: WorkSignal,
    }

    fn fixture() -> Fixture {
        Fixture {
            store: InMemoryItemStore::new(),
            ids: SequentialIdProvider::new("item"),
            clock: ManualTimeProvider::new(42_000),
            signal: WorkSignal::new(),
        }
    }

    async fn run(f: &Fixture, text: &str, cost: Cost) -> Result<Item> {
        execute(
            &f.store,
            &f.ids,
            &f.clock,
            &f.signal,
            EnqueueRequest {
                text: text.to_string(),
                cost,
            },
        )
        .await
    }

    /// True if a wakeup permit is stored on the signal
    async fn has_pending_wakeup(signal: &WorkSignal) -> bool {
        tokio::time::timeout(Duration::from_millis(20), signal.notified())
            .await
            .is_ok()
    }

    #[tokio::test]
    async fn test_enqueue_uses_injected_id_and_time() {
        let f = fixture();

        let item = run(&f, "payload", 7).await.unwrap();

        assert_eq!(item.id, "item-1");
        assert_eq!(item.enqueued_at, 42_000);
        assert_eq!(item.text, "payload");
        assert_eq!(item.cost, 7);
        assert_eq!(f.store.find_by_id(&item.id).await.unwrap(), Some(item));
    }

    #[tokio::test]
    async fn test_enqueue_signals_after_commit() {
        let f = fixture();

        run(&f, "payload", 0).await.unwrap();

        assert!(has_pending_wakeup(&f.signal).await);
    }

    #[tokio::test]
    async fn test_failed_insert_is_enqueue_error_without_signal() {
        let f = fixture();
        f.store.set_fail_inserts(true);

        let err = run(&f, "payload", 0).await.unwrap_err();

        assert!(matches!(err, AppError::Enqueue(_)));
        assert_eq!(f.store.count().await.unwrap(), 0);
        assert!(!has_pending_wakeup(&f.signal).await);
    }

    #[tokio::test]
    async fn test_failed_commit_is_enqueue_error_without_signal() {
        let f = fixture();
        f.store.set_fail_commits(true);

        let err = run(&f, "payload", 0).await.unwrap_err();

        assert!(matches!(err, AppError::Enqueue(_)));
        assert_eq!(f.store.count().await.unwrap(), 0);
        assert!(!has_pending_wakeup(&f.signal).await);
    }

    #[tokio::test]
    async fn test_empty_text_and_zero_cost_accepted() {
        let f = fixture();

        let item = run(&f, "", 0).await.unwrap();

        assert_eq!(item.text, "");
        assert_eq!(item.cost, 0);
    }

    #[tokio::test]
    async fn test_oversized_text_rejected_before_storage() {
        let f = fixture();
        let text = "x".repeat(MAX_TEXT_BYTES + 1);

        let err = run(&f, &text, 0).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(f.store.count().await.unwrap(), 0);
    }

    #[test]
    fn test_cost_defaults_to_zero_when_missing() {
        let req: EnqueueRequest = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert_eq!(req.cost, 0);
    }
}
