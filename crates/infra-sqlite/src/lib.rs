// Queue Manager Infrastructure - SQLite Adapter
// Implements: ItemStore, TransactionalItemStore

mod connection;
mod error;
mod item_store;
mod migration;
mod transaction;

pub use connection::{create_pool, open_database};
pub use item_store::SqliteItemStore;
pub use migration::run_migrations;
pub use transaction::SqliteItemTransaction;

// Note: sqlx::Error conversion is handled by `error::map_sqlx_error`
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
