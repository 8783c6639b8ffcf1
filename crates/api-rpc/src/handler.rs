//! RPC Method Handlers
//!
//! Thin translation between JSON-RPC params and the queue service.

use crate::error::to_rpc_error;
use crate::types::{ClearResponse, EnqueueRequest, GetRequest, ItemResponse, SizeResponse};
use jsonrpsee::types::ErrorObjectOwned;
use queue_manager_core::application::{self, QueueService};
use std::sync::Arc;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    service: Arc<QueueService>,
}

impl RpcHandler {
    pub fn new(service: Arc<QueueService>) -> Self {
        Self { service }
    }

    /// queue.enqueue.v1
    pub async fn enqueue(&self, params: EnqueueRequest) -> Result<ItemResponse, ErrorObjectOwned> {
        let item = self
            .service
            .enqueue(application::EnqueueRequest {
                text: params.text,
                cost: params.cost,
            })
            .await
            .map_err(to_rpc_error)?;

        Ok(item.into())
    }

    /// queue.dequeue.v1 - removes the oldest item without processing it
    pub async fn dequeue(&self) -> Result<ItemResponse, ErrorObjectOwned> {
        let item = self.service.dequeue().await.map_err(to_rpc_error)?;
        Ok(item.into())
    }

    /// queue.get.v1
    pub async fn get(&self, params: GetRequest) -> Result<ItemResponse, ErrorObjectOwned> {
        let item = self
            .service
            .get_by_id(&params.id)
            .await
            .map_err(to_rpc_error)?;
        Ok(item.into())
    }

    /// queue.size.v1
    pub async fn size(&self) -> Result<SizeResponse, ErrorObjectOwned> {
        let size = self.service.size().await.map_err(to_rpc_error)?;
        Ok(SizeResponse { size })
    }

    /// queue.clear.v1
    pub async fn clear(&self) -> Result<ClearResponse, ErrorObjectOwned> {
        self.service.clear().await.map_err(to_rpc_error)?;
        Ok(ClearResponse { cleared: true })
    }
}
