// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod item_store;
pub mod processor;
pub mod time_provider;
pub mod transaction;

// Re-exports
pub use id_provider::IdProvider;
pub use item_store::ItemStore;
pub use processor::{ProcessError, Processor};
pub use time_provider::TimeProvider;
pub use transaction::{ItemStoreTransaction, Transaction, TransactionalItemStore};
