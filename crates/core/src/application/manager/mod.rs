// Queue Manager - single consumer that drains the queue

pub mod constants;
mod shutdown;
mod signal;
mod state;

use constants::*;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use signal::WorkSignal;
pub use state::ManagerState;

use crate::application::queue::QueueService;
use crate::domain::Item;
use crate::error::{AppError, Result};
use crate::port::{ProcessError, Processor};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Consumer tuning
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Pause after a storage error before trying again
    pub error_backoff: Duration,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            error_backoff: ERROR_RECOVERY_SLEEP_DURATION,
        }
    }
}

/// Owns the one consumer task for a queue.
///
/// The consumer is spawned by [`QueueManager::start`] and runs until
/// [`QueueManager::stop`] is called or the manager is dropped. An item whose
/// processing is cut short by shutdown has already left the queue and is
/// not redelivered.
pub struct QueueManager {
    shutdown: ShutdownSender,
    state: Arc<watch::Sender<ManagerState>>,
    handle: Option<JoinHandle<()>>,
}

impl QueueManager {
    /// Spawn the consumer with default settings. Must be called from within
    /// a tokio runtime.
    pub fn start(service: Arc<QueueService>, processor: Arc<dyn Processor>) -> Self {
        Self::start_with_config(service, processor, ConsumerConfig::default())
    }

    pub fn start_with_config(
        service: Arc<QueueService>,
        processor: Arc<dyn Processor>,
        config: ConsumerConfig,
    ) -> Self {
        let (shutdown, token) = shutdown_channel();
        let (state_tx, _) = watch::channel(ManagerState::Running);
        let state = Arc::new(state_tx);

        let consumer = Consumer {
            signal: service.work_signal(),
            service,
            processor,
            shutdown: token,
            state: Arc::clone(&state),
            config,
        };
        let handle = tokio::spawn(consumer.run());

        info!("Queue manager started");
        Self {
            shutdown,
            state,
            handle: Some(handle),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ManagerState {
        *self.state.borrow()
    }

    /// Watch lifecycle changes
    pub fn subscribe_state(&self) -> watch::Receiver<ManagerState> {
        self.state.subscribe()
    }

    /// Request shutdown and wait for the consumer to exit.
    ///
    /// Calling it again after the consumer stopped is a no-op.
    pub async fn stop(&mut self) -> Result<()> {
        self.request_stop();

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .map_err(|e| AppError::Internal(format!("Consumer task failed: {}", e)))?;
        }
        Ok(())
    }

    fn request_stop(&self) {
        if let Err(e) = state::transition(&self.state, ManagerState::Stopping) {
            debug!(error = %e, "Stop already requested");
        }
        self.shutdown.shutdown();
    }
}

impl Drop for QueueManager {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.request_stop();
        }
    }
}

/// The consumer loop state, moved into its task
struct Consumer {
    service: Arc<QueueService>,
    signal: WorkSignal,
    processor: Arc<dyn Processor>,
    shutdown: ShutdownToken,
    state: Arc<watch::Sender<ManagerState>>,
    config: ConsumerConfig,
}

impl Consumer {
    async fn run(self) {
        info!("Consumer started");
        loop {
            if self.shutdown.is_shutdown() {
                info!("Consumer shutting down");
                break;
            }

            // Register interest before looking at the store: an enqueue that
            // commits after the dequeue below still wakes this waiter.
            let notified = self.signal.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.service.dequeue().await {
                Ok(item) if self.shutdown.is_shutdown() => {
                    // Stop arrived while the dequeue was in flight
                    warn!(item_id = %item.id, "Shutdown requested, item dropped before processing");
                }
                Ok(item) => self.process_item(item).await,
                Err(e) if e.is_not_found() => {
                    tokio::select! {
                        _ = &mut notified => {},
                        _ = self.shutdown.wait() => {
                            info!("Consumer interrupted while idle");
                            break;
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, "Dequeue failed, backing off");
                    tokio::select! {
                        _ = sleep(self.config.error_backoff) => {},
                        _ = self.shutdown.wait() => {
                            info!("Consumer interrupted during error recovery");
                            break;
                        }
                    }
                }
            }
        }

        if let Err(e) = state::transition(&self.state, ManagerState::Stopped) {
            warn!(error = %e, "Unexpected state on consumer exit");
        }
        info!("Consumer stopped");
    }

    /// Run the processor in its own task so a panic only costs this item
    async fn process_item(&self, item: Item) {
        let item_id = item.id.clone();
        let processor = Arc::clone(&self.processor);
        let mut handle = tokio::spawn(async move { processor.process(&item).await });

        tokio::select! {
            biased;
            joined = &mut handle => match joined {
                Ok(Ok(())) => debug!(item_id = %item_id, "Item done"),
                Ok(Err(e)) => error!(item_id = %item_id, error = %e, "Processing failed, item discarded"),
                Err(join_err) if join_err.is_panic() => {
                    error!(item_id = %item_id, "Processor panicked, item discarded: {:?}", join_err)
                }
                Err(join_err) => {
                    error!(item_id = %item_id, "Processing task cancelled: {:?}", join_err)
                }
            },
            _ = self.shutdown.wait() => {
                handle.abort();
                let _ = handle.await;
                let err = ProcessError::Interrupted(item_id.clone());
                warn!(item_id = %item_id, "{}, item dropped", err);
            }
        }
    }
}
