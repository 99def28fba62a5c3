//! Errors raised by the service layer.

use suistage_store::StoreError;
use suistage_sui::SuiError;
use suistage_walrus::WalrusError;
use thiserror::Error;

/// Errors from [`EventService`](crate::EventService) and the upload path.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Sui RPC call failed or returned unusable data
    #[error("chain error: {0}")]
    Chain(#[from] SuiError),

    /// SQLite operation failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Walrus upload or image validation failed
    #[error("blob store error: {0}")]
    Blob(#[from] WalrusError),

    /// The chain object does not look like a ticketing event
    #[error("invalid event data for {event_id}: {reason}")]
    InvalidEventData {
        /// Object that was read
        event_id: String,
        /// Which field is missing or malformed
        reason: String,
    },

    /// Requested resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Input rejected by a service-level check
    #[error("{0}")]
    Validation(String),

    /// Caller is not allowed to perform the operation
    #[error("{0}")]
    Unauthorized(String),
}

impl ServiceError {
    pub(crate) fn invalid_event(event_id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidEventData {
            event_id: event_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
