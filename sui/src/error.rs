//! Error types for the Sui JSON-RPC client

use thiserror::Error;

/// Errors that can occur when talking to a Sui full node
#[derive(Debug, Error)]
pub enum SuiError {
    /// HTTP request failed (connection refused, DNS, TLS, ...)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The node answered with a non-success HTTP status
    #[error("HTTP error (status {status}): {message}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Response body could not be decoded
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// The node returned a JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message from the node
        message: String,
    },

    /// The requested object does not exist (or was deleted)
    #[error("Object {object_id} not found on chain ({reason})")]
    ObjectNotFound {
        /// Object ID that was requested
        object_id: String,
        /// Error code reported by the node, e.g. `notExists`
        reason: String,
    },

    /// Object content was absent or not a Move struct
    #[error("Invalid object content: {0}")]
    InvalidContent(String),
}

impl SuiError {
    /// Whether this error means the object is simply not on chain.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound { .. })
    }
}
