// Manager lifecycle state

use crate::domain::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

/// Lifecycle of a [`super::QueueManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManagerState {
    Running,
    Stopping,
    Stopped,
}

impl ManagerState {
    /// Check if a state transition is valid
    pub fn can_transition_to(&self, next: ManagerState) -> bool {
        use ManagerState::*;
        matches!((self, next), (Running, Stopping) | (Stopping, Stopped))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ManagerState::Running => "RUNNING",
            ManagerState::Stopping => "STOPPING",
            ManagerState::Stopped => "STOPPED",
        }
    }
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publish `next` if the current state allows it
pub(crate) fn transition(
    state: &watch::Sender<ManagerState>,
    next: ManagerState,
) -> Result<(), DomainError> {
    let mut result = Ok(());
    state.send_if_modified(|current| {
        if current.can_transition_to(next) {
            *current = next;
            true
        } else {
            result = Err(DomainError::InvalidStateTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
            false
        }
    });
    result
}
