//! Sui JSON-RPC client implementation

use crate::{
    error::SuiError,
    types::{
        EventFilter, EventId, EventPage, ObjectDataOptions, ObjectsPage, RpcRequest, RpcResponse,
        SuiEvent, SuiObjectResponse, TransactionBlockOptions, TransactionBlockResponse,
    },
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default full node for testnet
pub const DEFAULT_RPC_URL: &str = "https://fullnode.testnet.sui.io:443";

/// Largest page a full node serves for `suix_queryEvents`
pub const QUERY_MAX_RESULT_LIMIT: usize = 50;

/// Sui full node client
///
/// Every call is a single request/response round trip; there is no retry,
/// caching or backoff. Failures are returned to the caller as [`SuiError`].
#[derive(Clone, Debug)]
pub struct SuiClient {
    client: Client,
    rpc_url: String,
    next_id: Arc<AtomicU64>,
}

impl SuiClient {
    /// Create a client for the given RPC endpoint
    #[must_use]
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), rpc_url)
    }

    /// Create a client that reuses an existing `reqwest::Client`
    #[must_use]
    pub fn with_http_client(client: Client, rpc_url: impl Into<String>) -> Self {
        Self {
            client,
            rpc_url: rpc_url.into(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// RPC endpoint this client talks to
    #[must_use]
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Fetch one object with content, owner and type.
    ///
    /// A missing object is not an error at this level: the node answers with
    /// an `error` entry inside the response, see [`SuiObjectResponse::move_fields`].
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, RPC errors, or parsing failures
    pub async fn get_object(&self, object_id: &str) -> Result<SuiObjectResponse, SuiError> {
        self.call(
            "sui_getObject",
            json!([object_id, ObjectDataOptions::full()]),
        )
        .await
    }

    /// Fetch several objects in one call.
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, RPC errors, or parsing failures
    pub async fn multi_get_objects(
        &self,
        object_ids: &[String],
    ) -> Result<Vec<SuiObjectResponse>, SuiError> {
        if object_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.call(
            "sui_multiGetObjects",
            json!([object_ids, ObjectDataOptions::full()]),
        )
        .await
    }

    /// Query events of one Move type, newest first.
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, RPC errors, or parsing failures
    pub async fn query_events(
        &self,
        event_type: &str,
        cursor: Option<&EventId>,
        limit: usize,
    ) -> Result<EventPage, SuiError> {
        let filter = EventFilter::MoveEventType(event_type.to_string());

        self.call("suix_queryEvents", json!([filter, cursor, limit, true]))
            .await
    }

    /// The newest `limit` events of one Move type.
    ///
    /// Follows the cursor in pages of at most [`QUERY_MAX_RESULT_LIMIT`]
    /// until `limit` events are collected or the node has no more.
    ///
    /// # Errors
    ///
    /// Returns the first page error; events gathered before it are dropped.
    pub async fn query_recent_events(
        &self,
        event_type: &str,
        limit: usize,
    ) -> Result<Vec<SuiEvent>, SuiError> {
        let mut events = Vec::with_capacity(limit.min(QUERY_MAX_RESULT_LIMIT));
        let mut cursor: Option<EventId> = None;

        while events.len() < limit {
            let page_size = (limit - events.len()).min(QUERY_MAX_RESULT_LIMIT);
            let page = self
                .query_events(event_type, cursor.as_ref(), page_size)
                .await?;

            let received = page.data.len();
            events.extend(page.data.into_iter().take(page_size));

            match page.next_cursor {
                Some(next) if page.has_next_page && received > 0 => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!(event_type, count = events.len(), "Recent events fetched");
        Ok(events)
    }

    /// Fetch a transaction block with input, effects, events and object changes.
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, RPC errors, or parsing failures
    pub async fn get_transaction_block(
        &self,
        digest: &str,
    ) -> Result<TransactionBlockResponse, SuiError> {
        self.call(
            "sui_getTransactionBlock",
            json!([digest, TransactionBlockOptions::default()]),
        )
        .await
    }

    /// List objects owned by `owner` whose type is `struct_type`.
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, RPC errors, or parsing failures
    pub async fn get_owned_objects(
        &self,
        owner: &str,
        struct_type: &str,
        cursor: Option<&str>,
        limit: Option<usize>,
    ) -> Result<ObjectsPage, SuiError> {
        let query = json!({
            "filter": { "StructType": struct_type },
            "options": ObjectDataOptions::content_and_type(),
        });

        self.call("suix_getOwnedObjects", json!([owner, query, cursor, limit]))
            .await
    }

    /// Check that the contract's registry object is reachable.
    ///
    /// Never fails: any error is logged and reported as `false`.
    pub async fn verify_contract_deployment(&self, registry_id: &str) -> bool {
        match self.get_object(registry_id).await {
            Ok(response) if response.data.is_some() => {
                tracing::info!(registry_id, "Contract verified on chain");
                true
            }
            Ok(_) => {
                tracing::warn!(registry_id, "Event registry not found");
                false
            }
            Err(e) => {
                tracing::error!(registry_id, error = %e, "Failed to verify contract");
                false
            }
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, SuiError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        tracing::debug!(method, "Sui RPC call");

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(method, error = %e, "Sui RPC request failed");
                SuiError::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(method, status = status.as_u16(), "Sui RPC returned HTTP error");
            return Err(SuiError::HttpStatus {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| SuiError::ResponseParseFailed(e.to_string()))?;

        if let Some(error) = body.error {
            tracing::error!(method, code = error.code, message = %error.message, "Sui RPC error");
            return Err(SuiError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        body.result
            .ok_or_else(|| SuiError::ResponseParseFailed("missing result".to_string()))
    }
}
