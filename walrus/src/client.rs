//! Walrus publisher/aggregator client

use crate::error::WalrusError;
use crate::image::{DEFAULT_MAX_IMAGE_BYTES, validate_image};
use reqwest::{Client, header};
use serde::Deserialize;

/// Default testnet aggregator
pub const DEFAULT_AGGREGATOR_URL: &str = "https://aggregator.walrus-testnet.walrus.space";

/// Default testnet publisher
pub const DEFAULT_PUBLISHER_URL: &str = "https://publisher.walrus-testnet.walrus.space";

/// Publisher response to a store request.
///
/// Exactly one of the two branches is present: a fresh blob, or one the
/// network had already certified.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreResponse {
    newly_created: Option<NewlyCreated>,
    already_certified: Option<AlreadyCertified>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewlyCreated {
    blob_object: BlobObject,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobObject {
    blob_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlreadyCertified {
    blob_id: String,
}

impl StoreResponse {
    fn into_blob_id(self) -> Option<String> {
        self.newly_created
            .map(|created| created.blob_object.blob_id)
            .or_else(|| self.already_certified.map(|certified| certified.blob_id))
    }
}

/// Walrus client
///
/// Uploads go to the publisher, reads go to the aggregator. Blob IDs are
/// content-derived, so storing the same bytes twice yields the same ID.
#[derive(Clone, Debug)]
pub struct WalrusClient {
    client: Client,
    publisher_url: String,
    aggregator_url: String,
    epochs: u32,
    max_image_bytes: usize,
}

impl WalrusClient {
    /// Create a client for the given publisher and aggregator
    #[must_use]
    pub fn new(publisher_url: impl Into<String>, aggregator_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            publisher_url: trim_slash(publisher_url.into()),
            aggregator_url: trim_slash(aggregator_url.into()),
            epochs: 5,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    /// Number of storage epochs requested per upload
    #[must_use]
    pub const fn with_epochs(mut self, epochs: u32) -> Self {
        self.epochs = epochs;
        self
    }

    /// Size ceiling applied by [`Self::upload_image`]
    #[must_use]
    pub const fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    /// Size ceiling applied by [`Self::upload_image`]
    #[must_use]
    pub const fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    /// Public URL of a blob on the aggregator
    #[must_use]
    pub fn blob_url(&self, blob_id: &str) -> String {
        format!("{}/v1/{blob_id}", self.aggregator_url)
    }

    /// Store raw bytes, returning the blob ID.
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, non-success responses, or a
    /// response without a blob ID
    pub async fn store(&self, bytes: impl Into<Vec<u8>>) -> Result<String, WalrusError> {
        let bytes = bytes.into();
        let size = bytes.len();

        let response = self
            .client
            .put(format!("{}/v1/store", self.publisher_url))
            .query(&[("epochs", self.epochs)])
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| WalrusError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "Walrus upload error");
            metrics::counter!("suistage.blob.upload_failed").increment(1);
            return Err(WalrusError::UploadFailed {
                status: status.as_u16(),
                message,
            });
        }

        let body: StoreResponse = response
            .json()
            .await
            .map_err(|e| WalrusError::ResponseParseFailed(e.to_string()))?;

        let blob_id = body.into_blob_id().ok_or(WalrusError::MissingBlobId)?;

        tracing::info!(blob_id = %blob_id, size, "File uploaded to Walrus");
        metrics::counter!("suistage.blob.uploaded").increment(1);

        Ok(blob_id)
    }

    /// Validate an image and store it.
    ///
    /// # Errors
    ///
    /// Returns [`WalrusError::InvalidImage`] without contacting Walrus when
    /// validation fails, otherwise the errors of [`Self::store`]
    pub async fn upload_image(&self, bytes: impl Into<Vec<u8>>) -> Result<String, WalrusError> {
        let bytes = bytes.into();
        validate_image(&bytes, self.max_image_bytes)?;
        self.store(bytes).await
    }

    /// Whether the aggregator can serve the blob.
    ///
    /// Uses a `HEAD` request; any failure counts as "does not exist".
    pub async fn exists(&self, blob_id: &str) -> bool {
        match self.client.head(self.blob_url(blob_id)).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::error!(blob_id, error = %e, "Error checking blob existence");
                false
            }
        }
    }

    /// Download a blob's bytes.
    ///
    /// # Errors
    ///
    /// Returns errors for network failures or non-success responses
    pub async fn download(&self, blob_id: &str) -> Result<Vec<u8>, WalrusError> {
        let response = self
            .client
            .get(self.blob_url(blob_id))
            .send()
            .await
            .map_err(|e| WalrusError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(blob_id, status = status.as_u16(), "Walrus download error");
            return Err(WalrusError::DownloadFailed {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| WalrusError::RequestFailed(e.to_string()))?;
        Ok(body.to_vec())
    }
}

fn trim_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
