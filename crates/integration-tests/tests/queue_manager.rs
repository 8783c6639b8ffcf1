//! Queue manager consuming from a real SQLite database

mod common;

use common::{enqueue, file_queue, service_on};
use queue_manager_core::application::{ManagerState, QueueManager};
use queue_manager_core::port::processor::mocks::RecordingProcessor;
use queue_manager_infra_sqlite::open_database;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

const WAIT: Duration = Duration::from_secs(10);

#[tokio::test]
async fn test_processes_in_arrival_order() {
    let q = file_queue().await;
    let a = enqueue(&q.service, "A", 100).await;
    let b = enqueue(&q.service, "B", 50).await;

    let processor = Arc::new(RecordingProcessor::new_success());
    let mut manager = QueueManager::start(q.service.clone(), processor.clone());

    assert!(processor.wait_for_completed(2, WAIT).await);
    assert_eq!(processor.completed_ids(), vec![a.id, b.id]);

    manager.stop().await.unwrap();
    assert_eq!(manager.state(), ManagerState::Stopped);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_enqueues_spread_across_idle_transitions_are_all_processed() {
    let q = file_queue().await;
    let processor = Arc::new(RecordingProcessor::new_success());
    let mut manager = QueueManager::start(q.service.clone(), processor.clone());

    // Varying gaps so enqueues land before, during and after the consumer
    // goes idle, without waiting for it in between
    let mut expected = Vec::new();
    for round in 0..100u64 {
        expected.push(enqueue(&q.service, &format!("r{}", round), 0).await.id);
        match round % 4 {
            0 => {}
            1 => tokio::task::yield_now().await,
            gap => tokio::time::sleep(Duration::from_micros(gap * 500)).await,
        }
    }

    assert!(processor.wait_for_completed(100, WAIT).await);
    assert_eq!(processor.completed_ids(), expected);
    assert_eq!(q.service.size().await.unwrap(), 0);

    manager.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_producers_every_item_processed_once() {
    let q = file_queue().await;
    let processor = Arc::new(RecordingProcessor::new_success());
    let mut manager = QueueManager::start(q.service.clone(), processor.clone());

    let mut producers = JoinSet::new();
    for p in 0..5 {
        let service = q.service.clone();
        producers.spawn(async move {
            let mut ids = Vec::new();
            for i in 0..40 {
                ids.push(enqueue(&service, &format!("p{}-{}", p, i), 0).await.id);
                if i % 5 == 0 {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
            }
            ids
        });
    }

    let mut expected = HashSet::new();
    while let Some(ids) = producers.join_next().await {
        expected.extend(ids.unwrap());
    }

    assert!(processor.wait_for_completed(200, WAIT).await);
    let processed = processor.completed_ids();
    assert_eq!(processed.len(), 200);
    assert_eq!(processed.into_iter().collect::<HashSet<_>>(), expected);
    assert_eq!(q.service.size().await.unwrap(), 0);

    manager.stop().await.unwrap();
}

#[tokio::test]
async fn test_backlog_from_previous_run_is_processed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.db");

    let mut expected = Vec::new();
    {
        let pool = open_database(&path).await.unwrap();
        let service = service_on(pool.clone());
        for i in 0..5 {
            expected.push(enqueue(&service, &format!("old-{}", i), 0).await.id);
        }
        pool.close().await;
    }

    let pool = open_database(&path).await.unwrap();
    let service = service_on(pool);
    let processor = Arc::new(RecordingProcessor::new_success());
    let mut manager = QueueManager::start(service.clone(), processor.clone());

    assert!(processor.wait_for_completed(5, WAIT).await);
    assert_eq!(processor.completed_ids(), expected);

    manager.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_mid_item_loses_only_that_item() {
    let q = file_queue().await;
    let processor = Arc::new(RecordingProcessor::new_success());
    let mut manager = QueueManager::start(q.service.clone(), processor.clone());

    enqueue(&q.service, "long", 60_000).await;
    assert!(processor.wait_for_calls(1, WAIT).await);
    let waiting = enqueue(&q.service, "next", 0).await;

    tokio::time::timeout(Duration::from_secs(2), manager.stop())
        .await
        .expect("stop must interrupt processing")
        .unwrap();

    assert_eq!(manager.state(), ManagerState::Stopped);
    assert!(processor.completed().is_empty());

    // The interrupted item is gone, the untouched one is still queued
    assert_eq!(q.service.size().await.unwrap(), 1);
    assert_eq!(q.service.dequeue().await.unwrap().id, waiting.id);
}
