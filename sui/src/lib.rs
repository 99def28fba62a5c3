//! # Sui JSON-RPC client
//!
//! Thin client for the handful of full-node RPC methods the SuiStage indexer
//! needs: object reads, typed event queries, transaction lookups and owned
//! object listings.
//!
//! ## Example
//!
//! ```no_run
//! use suistage_sui::{EventTypes, SuiClient};
//!
//! # async fn example() -> Result<(), suistage_sui::SuiError> {
//! let client = SuiClient::new("https://fullnode.testnet.sui.io:443");
//! let types = EventTypes::for_package("0x42");
//!
//! let page = client.query_events(&types.event_created, None, 50).await?;
//! for event in &page.data {
//!     println!("{} -> {}", event.id.tx_digest, event.parsed_json["event_id"]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod types;

// Re-export main types for convenience
pub use client::{DEFAULT_RPC_URL, QUERY_MAX_RESULT_LIMIT, SuiClient};
pub use error::SuiError;
pub use types::{
    EventId, EventPage, EventTypes, ObjectsPage, SuiEvent, SuiMoveObject, SuiObjectData,
    SuiObjectResponse, SuiParsedData, TransactionBlockResponse,
};
