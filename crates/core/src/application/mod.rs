// Application Layer - Use Cases and the consumer runtime

pub mod manager;
pub mod processor;
pub mod queue;

// Re-exports
pub use manager::{
    shutdown_channel, ConsumerConfig, ManagerState, QueueManager, ShutdownSender, ShutdownToken,
    WorkSignal,
};
pub use processor::DelayProcessor;
pub use queue::{EnqueueRequest, QueueService};
