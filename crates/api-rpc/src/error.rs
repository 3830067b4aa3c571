//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use hooktail_core::application::TriggerError;
use hooktail_core::error::AppError;
use jsonrpsee::types::ErrorObjectOwned;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const CONFLICT: i32 = 4002;
    pub const INTERNAL_ERROR: i32 = 5000;
}

/// Convert TriggerError to JSON-RPC ErrorObject
pub fn trigger_error(err: TriggerError) -> ErrorObjectOwned {
    match err {
        TriggerError::UnknownHook(_) => {
            ErrorObjectOwned::owned(code::NOT_FOUND, err.to_string(), None::<()>)
        }
        TriggerError::Busy(_) => ErrorObjectOwned::owned(code::CONFLICT, err.to_string(), None::<()>),
    }
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    match err {
        AppError::Trigger(e) => trigger_error(e),
        AppError::Validation(msg) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, msg, None::<()>)
        }
        AppError::Domain(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
        AppError::Config(msg) | AppError::Internal(msg) => {
            ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>)
        }
    }
}

/// Error for a hook id that has no state
pub fn not_found(hook_id: &str) -> ErrorObjectOwned {
    trigger_error(TriggerError::UnknownHook(hook_id.to_string()))
}
