// Dequeue Use Case

use crate::domain::Item;
use crate::error::{AppError, Result};
use crate::port::TransactionalItemStore;
use tracing::debug;

/// Remove and return the oldest item in one transaction
///
/// # Errors
/// - AppError::NotFound("Queue is empty") when nothing is queued
/// - AppError::Database for storage failures (the item, if any, stays queued)
pub async fn execute(store: &dyn TransactionalItemStore) -> Result<Item> {
    let mut tx = store.begin_transaction().await?;

    let fetched = match tx.fetch_oldest_and_remove().await {
        Ok(fetched) => fetched,
        Err(e) => {
            tx.rollback().await?;
            return Err(e);
        }
    };

    match fetched {
        Some(item) => {
            tx.commit().await?;
            debug!(item_id = %item.id, "Item dequeued");
            Ok(item)
        }
        None => {
            tx.rollback().await?;
            Err(AppError::NotFound("Queue is empty".to_string()))
        }
    }
}
