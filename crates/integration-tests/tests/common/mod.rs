//! Shared setup: a file-backed SQLite queue in a temp directory

#![allow(dead_code)]

use std::sync::Arc;

use queue_manager_core::application::{EnqueueRequest, QueueService};
use queue_manager_core::domain::Item;
use queue_manager_core::port::id_provider::UuidProvider;
use queue_manager_core::port::time_provider::SystemTimeProvider;
use queue_manager_infra_sqlite::{open_database, SqliteItemStore};
use sqlx::SqlitePool;
use tempfile::TempDir;

pub struct TestQueue {
    pub service: Arc<QueueService>,
    pub pool: SqlitePool,
    // Keeps the database file alive for the test
    pub dir: TempDir,
}

pub async fn file_queue() -> TestQueue {
    let dir = tempfile::tempdir().unwrap();
    let pool = open_database(&dir.path().join("queue.db")).await.unwrap();
    TestQueue {
        service: service_on(pool.clone()),
        pool,
        dir,
    }
}

pub fn service_on(pool: SqlitePool) -> Arc<QueueService> {
    Arc::new(QueueService::new(
        Arc::new(SqliteItemStore::new(pool)),
        Arc::new(UuidProvider),
        Arc::new(SystemTimeProvider),
    ))
}

pub async fn enqueue(service: &QueueService, text: &str, cost: u32) -> Item {
    service
        .enqueue(EnqueueRequest {
            text: text.to_string(),
            cost,
        })
        .await
        .unwrap()
}
