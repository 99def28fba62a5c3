//! Wire types for the Sui JSON-RPC API
//!
//! Only the parts of the node responses the indexer reads are modelled;
//! everything else is kept as raw [`serde_json::Value`].

use crate::error::SuiError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// JSON-RPC envelope
// ============================================================================

/// JSON-RPC 2.0 request body
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

/// JSON-RPC 2.0 response body
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorObject>,
}

/// JSON-RPC error object
#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

// ============================================================================
// Request options
// ============================================================================

/// Which parts of an object the node should include
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDataOptions {
    /// Include the Move type
    pub show_type: bool,
    /// Include the owner
    pub show_owner: bool,
    /// Include the parsed Move content
    pub show_content: bool,
}

impl ObjectDataOptions {
    /// Content, owner and type.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            show_type: true,
            show_owner: true,
            show_content: true,
        }
    }

    /// Content and type, no owner.
    #[must_use]
    pub const fn content_and_type() -> Self {
        Self {
            show_type: true,
            show_owner: false,
            show_content: true,
        }
    }
}

/// Which parts of a transaction block the node should include
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBlockOptions {
    /// Include transaction input
    pub show_input: bool,
    /// Include effects
    pub show_effects: bool,
    /// Include emitted events
    pub show_events: bool,
    /// Include object changes
    pub show_object_changes: bool,
}

impl Default for TransactionBlockOptions {
    fn default() -> Self {
        Self {
            show_input: true,
            show_effects: true,
            show_events: true,
            show_object_changes: true,
        }
    }
}

/// Filter for `suix_queryEvents`
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub enum EventFilter {
    /// Match a fully-qualified Move event type
    MoveEventType(String),
}

// ============================================================================
// Objects
// ============================================================================

/// Response for a single object lookup
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SuiObjectResponse {
    /// Object data when the object exists
    #[serde(default)]
    pub data: Option<SuiObjectData>,
    /// Error reported by the node (e.g. `notExists`, `deleted`)
    #[serde(default)]
    pub error: Option<ObjectResponseError>,
}

/// Node-side error for an object lookup
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ObjectResponseError {
    /// Error code, e.g. `notExists`
    pub code: String,
    /// Object the error refers to
    #[serde(default)]
    pub object_id: Option<String>,
}

/// Object payload
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SuiObjectData {
    /// Object ID (hex, `0x`-prefixed)
    pub object_id: String,
    /// Object version
    pub version: String,
    /// Object digest
    pub digest: String,
    /// Move type, when requested
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    /// Owner, when requested
    #[serde(default)]
    pub owner: Option<Value>,
    /// Parsed content, when requested
    #[serde(default)]
    pub content: Option<SuiParsedData>,
}

/// Parsed object content
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "dataType", rename_all = "camelCase")]
pub enum SuiParsedData {
    /// A Move struct instance
    MoveObject(SuiMoveObject),
    /// A published package
    Package {
        /// Disassembled modules
        #[serde(default)]
        disassembled: Value,
    },
}

/// Move struct instance with its fields
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SuiMoveObject {
    /// Fully-qualified struct type
    #[serde(rename = "type")]
    pub type_: String,
    /// Whether the object has `store`
    #[serde(default)]
    pub has_public_transfer: bool,
    /// Struct fields as JSON
    pub fields: Map<String, Value>,
}

impl SuiObjectResponse {
    /// Borrow the Move struct fields of this object.
    ///
    /// # Errors
    ///
    /// - [`SuiError::ObjectNotFound`] if the node reported an error for the object
    /// - [`SuiError::InvalidContent`] if data or content is missing, or the
    ///   content is not a Move object
    pub fn move_fields(&self) -> Result<&Map<String, Value>, SuiError> {
        if let Some(error) = &self.error {
            return Err(SuiError::ObjectNotFound {
                object_id: error.object_id.clone().unwrap_or_default(),
                reason: error.code.clone(),
            });
        }

        let data = self
            .data
            .as_ref()
            .ok_or_else(|| SuiError::InvalidContent("object data missing".to_string()))?;

        match &data.content {
            Some(SuiParsedData::MoveObject(object)) => Ok(&object.fields),
            Some(SuiParsedData::Package { .. }) => Err(SuiError::InvalidContent(format!(
                "object {} is not a Move object",
                data.object_id
            ))),
            None => Err(SuiError::InvalidContent(format!(
                "object {} has no content",
                data.object_id
            ))),
        }
    }
}

// ============================================================================
// Events
// ============================================================================

/// Event identifier, also used as pagination cursor
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventId {
    /// Digest of the emitting transaction
    pub tx_digest: String,
    /// Sequence number within the transaction
    pub event_seq: String,
}

/// A Move event emitted by a transaction
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SuiEvent {
    /// Event identifier
    pub id: EventId,
    /// Package that emitted the event
    pub package_id: String,
    /// Module that emitted the event
    pub transaction_module: String,
    /// Transaction sender
    pub sender: String,
    /// Fully-qualified event type
    #[serde(rename = "type")]
    pub type_: String,
    /// Event payload as JSON
    #[serde(default)]
    pub parsed_json: Value,
    /// Checkpoint timestamp in milliseconds (stringified u64)
    #[serde(default)]
    pub timestamp_ms: Option<String>,
}

impl SuiEvent {
    /// Checkpoint timestamp in milliseconds, when present and numeric.
    #[must_use]
    pub fn timestamp_millis(&self) -> Option<i64> {
        self.timestamp_ms.as_deref().and_then(|s| s.parse().ok())
    }
}

/// One page of a paginated RPC result
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T, C> {
    /// Items on this page
    pub data: Vec<T>,
    /// Cursor to pass for the next page
    pub next_cursor: Option<C>,
    /// Whether more pages exist
    #[serde(default)]
    pub has_next_page: bool,
}

/// Page of events
pub type EventPage = Page<SuiEvent, EventId>;

/// Page of owned objects
pub type ObjectsPage = Page<SuiObjectResponse, String>;

// ============================================================================
// Transactions
// ============================================================================

/// Transaction block details
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBlockResponse {
    /// Transaction digest
    pub digest: String,
    /// Transaction input
    #[serde(default)]
    pub transaction: Option<Value>,
    /// Effects
    #[serde(default)]
    pub effects: Option<Value>,
    /// Emitted events
    #[serde(default)]
    pub events: Option<Vec<SuiEvent>>,
    /// Object changes
    #[serde(default)]
    pub object_changes: Option<Vec<Value>>,
    /// Checkpoint timestamp in milliseconds
    #[serde(default)]
    pub timestamp_ms: Option<String>,
    /// Checkpoint sequence number
    #[serde(default)]
    pub checkpoint: Option<String>,
}

// ============================================================================
// Contract event types
// ============================================================================

/// Fully-qualified type names emitted by the ticketing contract
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventTypes {
    /// `<pkg>::event::EventCreated`
    pub event_created: String,
    /// `<pkg>::event::EventUpdated`
    pub event_updated: String,
    /// `<pkg>::event::EventCancelled`
    pub event_cancelled: String,
    /// `<pkg>::event::SeatsReserved`
    pub seats_reserved: String,
    /// `<pkg>::event::Event` (the shared struct itself)
    pub event_struct: String,
}

impl EventTypes {
    /// Build the type names for a published package.
    #[must_use]
    pub fn for_package(package_id: &str) -> Self {
        Self {
            event_created: format!("{package_id}::event::EventCreated"),
            event_updated: format!("{package_id}::event::EventUpdated"),
            event_cancelled: format!("{package_id}::event::EventCancelled"),
            seats_reserved: format!("{package_id}::event::SeatsReserved"),
            event_struct: format!("{package_id}::event::Event"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_move_fields_from_move_object() {
        let response: SuiObjectResponse = serde_json::from_value(json!({
            "data": {
                "objectId": "0x1",
                "version": "7",
                "digest": "abc",
                "type": "0x2::event::Event",
                "content": {
                    "dataType": "moveObject",
                    "type": "0x2::event::Event",
                    "hasPublicTransfer": false,
                    "fields": { "name": "Concert", "total_seats": "100" }
                }
            }
        }))
        .unwrap();

        let fields = response.move_fields().unwrap();
        assert_eq!(fields["name"], "Concert");
        assert_eq!(fields["total_seats"], "100");
    }

    #[test]
    fn test_move_fields_not_exists() {
        let response: SuiObjectResponse = serde_json::from_value(json!({
            "error": { "code": "notExists", "object_id": "0xdead" }
        }))
        .unwrap();

        let err = response.move_fields().unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("0xdead"));
    }

    #[test]
    fn test_move_fields_rejects_package() {
        let response: SuiObjectResponse = serde_json::from_value(json!({
            "data": {
                "objectId": "0x2",
                "version": "1",
                "digest": "d",
                "content": { "dataType": "package", "disassembled": {} }
            }
        }))
        .unwrap();

        assert!(matches!(
            response.move_fields(),
            Err(SuiError::InvalidContent(_))
        ));
    }

    #[test]
    fn test_move_fields_missing_content() {
        let response: SuiObjectResponse = serde_json::from_value(json!({
            "data": { "objectId": "0x3", "version": "1", "digest": "d" }
        }))
        .unwrap();

        assert!(matches!(
            response.move_fields(),
            Err(SuiError::InvalidContent(_))
        ));
    }

    #[test]
    fn test_event_filter_serialization() {
        let filter = EventFilter::MoveEventType("0x2::event::EventCreated".to_string());
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({ "MoveEventType": "0x2::event::EventCreated" })
        );
    }

    #[test]
    fn test_event_types_for_package() {
        let types = EventTypes::for_package("0xabc");
        assert_eq!(types.event_created, "0xabc::event::EventCreated");
        assert_eq!(types.seats_reserved, "0xabc::event::SeatsReserved");
        assert_eq!(types.event_struct, "0xabc::event::Event");
    }

    #[test]
    fn test_event_timestamp_millis() {
        let event: SuiEvent = serde_json::from_value(json!({
            "id": { "txDigest": "D1", "eventSeq": "0" },
            "packageId": "0x2",
            "transactionModule": "event",
            "sender": "0x5",
            "type": "0x2::event::EventCreated",
            "parsedJson": { "event_id": "0x9" },
            "timestampMs": "1700000000000"
        }))
        .unwrap();

        assert_eq!(event.timestamp_millis(), Some(1_700_000_000_000));
        assert_eq!(event.parsed_json["event_id"], "0x9");
    }

    #[test]
    fn test_event_page_cursor_is_optional() {
        let last: EventPage = serde_json::from_value(json!({
            "data": [],
            "hasNextPage": false
        }))
        .unwrap();
        assert!(last.next_cursor.is_none());

        let first: EventPage = serde_json::from_value(json!({
            "data": [],
            "nextCursor": { "txDigest": "D9", "eventSeq": "3" },
            "hasNextPage": true
        }))
        .unwrap();
        assert_eq!(first.next_cursor.map(|c| c.tx_digest), Some("D9".to_string()));
        assert!(first.has_next_page);
    }
}
