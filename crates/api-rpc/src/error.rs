//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use queue_manager_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const DB_ERROR: i32 = 5001;
    pub const ENQUEUE_ERROR: i32 = 5003;
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    match err {
        AppError::Validation(msg) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, msg, None::<()>)
        }
        AppError::Domain(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
        AppError::Serialization(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
        AppError::NotFound(msg) => ErrorObjectOwned::owned(code::NOT_FOUND, msg, None::<()>),
        AppError::Enqueue(msg) => ErrorObjectOwned::owned(code::ENQUEUE_ERROR, msg, None::<()>),
        AppError::Database(msg) => ErrorObjectOwned::owned(code::DB_ERROR, msg, None::<()>),
        AppError::Processing(e) => {
            ErrorObjectOwned::owned(code::INTERNAL_ERROR, e.to_string(), None::<()>)
        }
        AppError::Io(e) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, e.to_string(), None::<()>),
        AppError::Config(msg) | AppError::Internal(msg) => {
            ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>)
        }
    }
}
