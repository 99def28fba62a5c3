//! # Walrus blob storage client
//!
//! Stores event images on Walrus and hands back content-derived blob IDs.
//!
//! ## Example
//!
//! ```no_run
//! use suistage_walrus::{WalrusClient, DEFAULT_AGGREGATOR_URL, DEFAULT_PUBLISHER_URL};
//!
//! # async fn example(image: Vec<u8>) -> Result<(), suistage_walrus::WalrusError> {
//! let walrus = WalrusClient::new(DEFAULT_PUBLISHER_URL, DEFAULT_AGGREGATOR_URL);
//!
//! let blob_id = walrus.upload_image(image).await?;
//! println!("stored at {}", walrus.blob_url(&blob_id));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod image;

pub use client::{DEFAULT_AGGREGATOR_URL, DEFAULT_PUBLISHER_URL, WalrusClient};
pub use error::{ImageError, WalrusError};
pub use image::{
    ALLOWED_MIME_TYPES, DEFAULT_MAX_IMAGE_BYTES, ImageFormat, is_allowed_mime_type,
    validate_image,
};
