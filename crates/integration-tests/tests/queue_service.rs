//! Queue service over a real SQLite database

mod common;

use common::{enqueue, file_queue, service_on};
use queue_manager_core::error::AppError;
use queue_manager_infra_sqlite::open_database;
use std::collections::HashSet;
use tokio::task::JoinSet;

#[tokio::test]
async fn test_fifo_round_trip() {
    let q = file_queue().await;

    let a = enqueue(&q.service, "A", 100).await;
    let b = enqueue(&q.service, "B", 50).await;

    assert_eq!(q.service.dequeue().await.unwrap().text, "A");
    assert_eq!(q.service.dequeue().await.unwrap().text, "B");
    assert!(a.enqueued_at <= b.enqueued_at);

    let err = q.service.dequeue().await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_size_and_clear() {
    let q = file_queue().await;

    enqueue(&q.service, "X", 10).await;
    assert_eq!(q.service.size().await.unwrap(), 1);

    q.service.clear().await.unwrap();
    assert_eq!(q.service.size().await.unwrap(), 0);

    // Clearing an empty queue is fine
    q.service.clear().await.unwrap();
}

#[tokio::test]
async fn test_get_by_id_does_not_consume() {
    let q = file_queue().await;
    let item = enqueue(&q.service, "keep me", 3).await;

    let found = q.service.get_by_id(&item.id).await.unwrap();
    assert_eq!(found, item);
    assert_eq!(q.service.size().await.unwrap(), 1);

    let err = q.service.get_by_id(&"unknown".to_string()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_items_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.db");

    let mut expected = Vec::new();
    {
        let pool = open_database(&path).await.unwrap();
        let service = service_on(pool.clone());
        for i in 0..10 {
            expected.push(enqueue(&service, &format!("item-{}", i), 0).await.id);
        }
        pool.close().await;
    }

    let pool = open_database(&path).await.unwrap();
    let service = service_on(pool);
    assert_eq!(service.size().await.unwrap(), 10);

    let mut seen = Vec::new();
    while let Ok(item) = service.dequeue().await {
        seen.push(item.id);
    }
    assert_eq!(seen, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_enqueue_and_dequeue_no_loss() {
    let q = file_queue().await;

    let mut producers = JoinSet::new();
    for p in 0..4 {
        let service = q.service.clone();
        producers.spawn(async move {
            let mut ids = Vec::new();
            for i in 0..25 {
                ids.push(enqueue(&service, &format!("p{}-{}", p, i), 0).await.id);
            }
            ids
        });
    }

    // Two competing dequeuers
    let mut consumers = JoinSet::new();
    for _ in 0..2 {
        let service = q.service.clone();
        consumers.spawn(async move {
            let mut ids = Vec::new();
            let mut idle_rounds = 0;
            while idle_rounds < 50 {
                match service.dequeue().await {
                    Ok(item) => {
                        ids.push(item.id);
                        idle_rounds = 0;
                    }
                    Err(e) if e.is_not_found() => {
                        idle_rounds += 1;
                        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                    }
                    Err(e) => panic!("dequeue failed: {}", e),
                }
            }
            ids
        });
    }

    let mut enqueued = HashSet::new();
    while let Some(ids) = producers.join_next().await {
        enqueued.extend(ids.unwrap());
    }

    let mut dequeued = Vec::new();
    while let Some(ids) = consumers.join_next().await {
        dequeued.extend(ids.unwrap());
    }

    assert_eq!(dequeued.len(), 100, "every item dequeued exactly once");
    assert_eq!(dequeued.into_iter().collect::<HashSet<_>>(), enqueued);
    assert_eq!(q.service.size().await.unwrap(), 0);
}
