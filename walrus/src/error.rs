//! Error types for the Walrus client and image validation

use thiserror::Error;

/// Errors that can occur when talking to Walrus
#[derive(Debug, Error)]
pub enum WalrusError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Publisher rejected the upload
    #[error("Walrus upload failed (status {status}): {message}")]
    UploadFailed {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Aggregator could not serve the blob
    #[error("Failed to download from Walrus (status {status}): {message}")]
    DownloadFailed {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Publisher response had no blob ID
    #[error("No blob ID returned from Walrus")]
    MissingBlobId,

    /// Response body could not be decoded
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Upload rejected before it reached Walrus
    #[error(transparent)]
    InvalidImage(#[from] ImageError),
}

/// Reasons an image buffer is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// Buffer exceeds the size ceiling
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    TooLarge {
        /// Buffer size in bytes
        size: usize,
        /// Configured ceiling in bytes
        max: usize,
    },

    /// Leading bytes match no known image signature
    #[error("Invalid image file format (only JPG, PNG, GIF, WebP allowed)")]
    UnsupportedFormat,
}
