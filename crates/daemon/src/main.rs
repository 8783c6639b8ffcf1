//! Queue Manager - Main Entry Point
//! JSON-RPC server + single queue consumer over a SQLite-backed queue

mod config;
mod logging;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

use config::DaemonConfig;
use queue_manager_api_rpc::{RpcServer, RpcServerConfig};
use queue_manager_core::application::{DelayProcessor, QueueManager, QueueService};
use queue_manager_core::port::id_provider::UuidProvider;
use queue_manager_core::port::time_provider::SystemTimeProvider;
use queue_manager_core::port::TimeProvider;
use queue_manager_infra_sqlite::{open_database, SqliteItemStore};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration and logging
    let config = DaemonConfig::from_env().context("Invalid configuration")?;
    let _log_guard = logging::init(config.log_format)?;

    info!("Queue Manager v{} starting...", VERSION);

    // 2. Database
    info!(db_path = %config.db_path.display(), "Initializing database...");
    let pool = open_database(&config.db_path)
        .await
        .context("Database initialization failed")?;

    // 3. Wiring
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let store = Arc::new(SqliteItemStore::new(pool.clone()));
    let service = Arc::new(QueueService::new(
        store,
        Arc::new(UuidProvider),
        time_provider.clone(),
    ));

    let backlog = service.size().await.context("Failed to read queue size")?;
    info!(backlog = backlog, "Persisted items will be processed first");

    // 4. Consumer
    let processor = Arc::new(DelayProcessor::new(time_provider));
    let mut manager = QueueManager::start(service.clone(), processor);

    // 5. JSON-RPC server
    let rpc_config = RpcServerConfig {
        host: config.rpc_host.clone(),
        port: config.rpc_port,
    };
    let (addr, rpc_handle) = RpcServer::new(rpc_config, service)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(addr = %addr, "System ready, press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 7. Graceful shutdown: stop intake first, then the consumer
    if let Err(e) = rpc_handle.stop() {
        warn!(error = %e, "RPC server already stopped");
    }
    rpc_handle.stopped().await;

    match tokio::time::timeout(config.shutdown_timeout, manager.stop()).await {
        Ok(Ok(())) => info!(state = %manager.state(), "Queue manager stopped"),
        Ok(Err(e)) => error!(error = %e, "Queue manager stopped with error"),
        Err(_) => warn!(
            timeout_secs = config.shutdown_timeout.as_secs(),
            "Queue manager did not stop in time"
        ),
    }

    pool.close().await;
    telemetry::shutdown();
    info!("Shutdown complete.");

    Ok(())
}
