// Transaction port for atomic queue operations

use crate::domain::Item;
use crate::error::Result;
use crate::port::ItemStore;
use async_trait::async_trait;

/// Transaction trait for atomic operations
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Item store that can scope mutations to a transaction
#[async_trait]
pub trait TransactionalItemStore: ItemStore {
    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<Box<dyn ItemStoreTransaction>>;
}

/// Mutating ItemStore operations within a transaction.
///
/// Nothing done through this handle is visible to other readers until
/// `commit` returns Ok. Dropping the handle without committing rolls back.
#[async_trait]
pub trait ItemStoreTransaction: Transaction {
    /// Insert item (within transaction)
    async fn insert(&mut self, item: &Item) -> Result<()>;

    /// Remove and return the oldest item (within transaction)
    async fn fetch_oldest_and_remove(&mut self) -> Result<Option<Item>>;

    /// Remove every item (within transaction)
    async fn delete_all(&mut self) -> Result<u64>;
}
