// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Queue empty on dequeue, or unknown item id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Store write or commit failed while enqueuing; nothing was persisted
    #[error("Enqueue failed: {0}")]
    Enqueue(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Processing error: {0}")]
    Processing(#[from] crate::port::ProcessError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in the infra-sqlite crate
// by converting to AppError::Database(String)
