// Manager constants (no magic values)
use std::time::Duration;

/// Sleep duration after a storage error before the next dequeue (1s)
pub const ERROR_RECOVERY_SLEEP_DURATION: Duration = Duration::from_secs(1);
