//! JSON-RPC Server
//!
//! Serves the queue methods over HTTP on a TCP socket.

use crate::handler::RpcHandler;
use crate::types::{EnqueueRequest, GetRequest};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use queue_manager_core::application::QueueService;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9527;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, service: Arc<QueueService>) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(service)),
        }
    }

    /// Start the JSON-RPC server
    ///
    /// Returns the bound address (useful with port 0) and the handle used to
    /// stop it.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = build_module(self.handler).map_err(|e| e.to_string())?;

        info!(addr = %local_addr, "JSON-RPC server started successfully");
        Ok((local_addr, server.start(module)))
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn build_module(handler: Arc<RpcHandler>) -> Result<RpcModule<()>, BoxError> {
    let mut module = RpcModule::new(());

    let h = handler.clone();
    module.register_async_method("queue.enqueue.v1", move |params, _, _| {
        let handler = h.clone();
        async move {
            let req: EnqueueRequest = params.parse()?;
            handler.enqueue(req).await
        }
    })?;

    let h = handler.clone();
    module.register_async_method("queue.dequeue.v1", move |_, _, _| {
        let handler = h.clone();
        async move { handler.dequeue().await }
    })?;

    let h = handler.clone();
    module.register_async_method("queue.get.v1", move |params, _, _| {
        let handler = h.clone();
        async move {
            let req: GetRequest = params.parse()?;
            handler.get(req).await
        }
    })?;

    let h = handler.clone();
    module.register_async_method("queue.size.v1", move |_, _, _| {
        let handler = h.clone();
        async move { handler.size().await }
    })?;

    let h = handler;
    module.register_async_method("queue.clear.v1", move |_, _, _| {
        let handler = h.clone();
        async move { handler.clear().await }
    })?;

    Ok(module)
}
