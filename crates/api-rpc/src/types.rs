//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use queue_manager_core::domain::Item;
use serde::{Deserialize, Serialize};

/// queue.enqueue.v1 - Enqueue an item
#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    pub text: String,
    #[serde(default)]
    pub cost: u32,
}

/// queue.get.v1 - Look up an item by id
#[derive(Debug, Deserialize)]
pub struct GetRequest {
    pub id: String,
}

/// Item as returned by enqueue, dequeue and get
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemResponse {
    pub id: String,
    pub text: String,
    pub cost: u32,
    pub enqueued_at: i64,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            text: item.text,
            cost: item.cost,
            enqueued_at: item.enqueued_at,
        }
    }
}

/// queue.size.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeResponse {
    pub size: u64,
}

/// queue.clear.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub cleared: bool,
}
