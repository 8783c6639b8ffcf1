// Item Store Port (Interface)

use crate::domain::{Item, ItemId};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for queue item persistence.
///
/// Every operation is atomic on its own. Callers that need several
/// mutations to commit together go through [`crate::port::TransactionalItemStore`].
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Insert a new item
    async fn insert(&self, item: &Item) -> Result<()>;

    /// Remove and return the oldest item (enqueued_at ASC, then insertion order)
    async fn fetch_oldest_and_remove(&self) -> Result<Option<Item>>;

    /// Find item by ID
    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>>;

    /// Number of stored items
    async fn count(&self) -> Result<u64>;

    /// Delete every item, returning how many were removed
    async fn delete_all(&self) -> Result<u64>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use crate::port::{ItemStoreTransaction, Transaction, TransactionalItemStore};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::{Mutex, Notify, OwnedMutexGuard};

    #[derive(Debug, Clone, Default)]
    struct MemoryState {
        // (insertion sequence, item)
        items: Vec<(u64, Item)>,
        next_seq: u64,
    }

    impl MemoryState {
        fn insert(&mut self, item: &Item) -> Result<()> {
            if self.items.iter().any(|(_, existing)| existing.id == item.id) {
                return Err(AppError::Database(format!(
                    "Unique constraint violation: items.id {}",
                    item.id
                )));
            }
            self.next_seq += 1;
            self.items.push((self.next_seq, item.clone()));
            Ok(())
        }

        fn fetch_oldest_and_remove(&mut self) -> Option<Item> {
            let oldest = self
                .items
                .iter()
                .enumerate()
                .min_by_key(|(_, (seq, item))| (item.enqueued_at, *seq))
                .map(|(idx, _)| idx)?;
            Some(self.items.remove(oldest).1)
        }

        fn find_by_id(&self, id: &ItemId) -> Option<Item> {
            self.items
                .iter()
                .find(|(_, item)| &item.id == id)
                .map(|(_, item)| item.clone())
        }

        fn delete_all(&mut self) -> u64 {
            let removed = self.items.len() as u64;
            self.items.clear();
            removed
        }
    }

    /// Rendezvous held by a transaction that found the store empty.
    ///
    /// The transaction releases the store lock, fires `reached` and then waits
    /// for `resume` before returning to its caller. Between the two, other
    /// tasks can commit writes that the caller has not seen.
    #[derive(Default)]
    pub struct EmptyFetchGate {
        reached: Notify,
        resume: Notify,
        open: AtomicBool,
    }

    impl EmptyFetchGate {
        /// Wait until a transaction has found the store empty and is parked
        pub async fn reached(&self) {
            self.reached.notified().await;
        }

        /// Let the parked transaction return
        pub fn resume(&self) {
            self.resume.notify_one();
        }

        /// Stop parking transactions and release any parked one
        pub fn open(&self) {
            self.open.store(true, Ordering::SeqCst);
            self.resume.notify_one();
        }

        async fn pass(&self) {
            if self.open.load(Ordering::SeqCst) {
                return;
            }
            self.reached.notify_one();
            self.resume.notified().await;
        }
    }

    #[derive(Default)]
    struct Faults {
        fail_inserts: AtomicBool,
        fail_commits: AtomicBool,
        failing_dequeues: AtomicUsize,
        empty_gate: std::sync::Mutex<Option<Arc<EmptyFetchGate>>>,
    }

    impl Faults {
        fn take_dequeue_failure(&self) -> bool {
            self.failing_dequeues
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }

    /// In-memory item store with injectable faults.
    ///
    /// A transaction holds the store lock until it commits or is dropped,
    /// which gives the same serialization a database write lock would.
    #[derive(Clone, Default)]
    pub struct InMemoryItemStore {
        state: Arc<Mutex<MemoryState>>,
        faults: Arc<Faults>,
    }

    impl InMemoryItemStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every insert fail with a database error
        pub fn set_fail_inserts(&self, fail: bool) {
            self.faults.fail_inserts.store(fail, Ordering::SeqCst);
        }

        /// Make every transaction commit fail with a database error
        pub fn set_fail_commits(&self, fail: bool) {
            self.faults.fail_commits.store(fail, Ordering::SeqCst);
        }

        /// Fail the next `count` fetch-oldest calls with a database error
        pub fn fail_next_dequeues(&self, count: usize) {
            self.faults.failing_dequeues.store(count, Ordering::SeqCst);
        }

        /// Park every transaction whose fetch-oldest came back empty at the
        /// returned gate, after the store lock is released
        pub fn gate_empty_fetches(&self) -> Arc<EmptyFetchGate> {
            let gate = Arc::new(EmptyFetchGate::default());
            *self.faults.empty_gate.lock().unwrap() = Some(Arc::clone(&gate));
            gate
        }

        fn empty_gate(&self) -> Option<Arc<EmptyFetchGate>> {
            self.faults.empty_gate.lock().unwrap().clone()
        }

        /// Snapshot of stored item ids in queue order
        pub async fn ids_in_order(&self) -> Vec<ItemId> {
            let state = self.state.lock().await;
            let mut items = state.items.clone();
            items.sort_by_key(|(seq, item)| (item.enqueued_at, *seq));
            items.into_iter().map(|(_, item)| item.id).collect()
        }

        fn check_insert(&self) -> Result<()> {
            if self.faults.fail_inserts.load(Ordering::SeqCst) {
                return Err(AppError::Database("Database full: injected fault".to_string()));
            }
            Ok(())
        }

        fn check_dequeue(&self) -> Result<()> {
            if self.faults.take_dequeue_failure() {
                return Err(AppError::Database(
                    "Database locked (SQLITE_BUSY): injected fault".to_string(),
                ));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ItemStore for InMemoryItemStore {
        async fn insert(&self, item: &Item) -> Result<()> {
            self.check_insert()?;
            self.state.lock().await.insert(item)
        }

        async fn fetch_oldest_and_remove(&self) -> Result<Option<Item>> {
            self.check_dequeue()?;
            Ok(self.state.lock().await.fetch_oldest_and_remove())
        }

        async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>> {
            Ok(self.state.lock().await.find_by_id(id))
        }

        async fn count(&self) -> Result<u64> {
            Ok(self.state.lock().await.items.len() as u64)
        }

        async fn delete_all(&self) -> Result<u64> {
            Ok(self.state.lock().await.delete_all())
        }
    }

    #[async_trait]
    impl TransactionalItemStore for InMemoryItemStore {
        async fn begin_transaction(&self) -> Result<Box<dyn ItemStoreTransaction>> {
            let guard = Arc::clone(&self.state).lock_owned().await;
            let working = guard.clone();
            Ok(Box::new(InMemoryTransaction {
                guard,
                working,
                store: self.clone(),
                saw_empty: false,
            }))
        }
    }

    /// Staged changes applied to the shared state on commit
    pub struct InMemoryTransaction {
        guard: OwnedMutexGuard<MemoryState>,
        working: MemoryState,
        store: InMemoryItemStore,
        saw_empty: bool,
    }

    impl InMemoryTransaction {
        async fn finish_empty(store: InMemoryItemStore, saw_empty: bool) {
            if !saw_empty {
                return;
            }
            if let Some(gate) = store.empty_gate() {
                gate.pass().await;
            }
        }
    }

    #[async_trait]
    impl Transaction for InMemoryTransaction {
        async fn commit(self: Box<Self>) -> Result<()> {
            let InMemoryTransaction {
                mut guard,
                working,
                store,
                saw_empty,
            } = *self;
            if store.faults.fail_commits.load(Ordering::SeqCst) {
                return Err(AppError::Database("Commit failed: injected fault".to_string()));
            }
            *guard = working;
            drop(guard);
            Self::finish_empty(store, saw_empty).await;
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<()> {
            let InMemoryTransaction {
                guard,
                store,
                saw_empty,
                ..
            } = *self;
            drop(guard);
            Self::finish_empty(store, saw_empty).await;
            Ok(())
        }
    }

    #[async_trait]
    impl ItemStoreTransaction for InMemoryTransaction {
        async fn insert(&mut self, item: &Item) -> Result<()> {
            self.store.check_insert()?;
            self.working.insert(item)
        }

        async fn fetch_oldest_and_remove(&mut self) -> Result<Option<Item>> {
            self.store.check_dequeue()?;
            let fetched = self.working.fetch_oldest_and_remove();
            self.saw_empty = fetched.is_none();
            Ok(fetched)
        }

        async fn delete_all(&mut self) -> Result<u64> {
            Ok(self.working.delete_all())
        }
    }

}
