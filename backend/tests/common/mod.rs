//! Shared fixtures: a mock Sui node, a mock Walrus publisher and an
//! in-memory store.

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use serde_json::{Value, json};
use suistage_backend::bootstrap::ResourceManager;
use suistage_backend::config::Config;
use suistage_store::{EventRecord, SqliteStore};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PACKAGE_ID: &str = "0x2";
pub const ORGANIZER: &str = "0x00000000000000000000000000000000000000000000000000000000000000aa";

/// A well-formed Sui object ID.
pub fn object_id(n: u32) -> String {
    format!("0x{n:064x}")
}

/// A well-formed Sui address.
pub fn address(n: u32) -> String {
    format!("0x{:064x}", 0xb000_0000_u64 + u64::from(n))
}

pub fn rpc_ok(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result,
    }))
}

/// Move fields of an event object, as a full node returns them.
pub fn event_fields(name: &str, total_seats: u64, available_seats: u64) -> Value {
    json!({
        "id": { "id": "ignored" },
        "name": name,
        "description": "On-chain event",
        "venue": "Lisbon",
        "date": "1900000000000",
        "organizer": ORGANIZER,
        "total_seats": total_seats.to_string(),
        "available_seats": available_seats.to_string(),
        "price_per_seat": "10",
        "image_url": "",
        "is_active": true,
        "created_at": "1700000000000",
        "updated_at": "1700000000000"
    })
}

pub fn object_response(id: &str, fields: Value) -> ResponseTemplate {
    rpc_ok(json!({
        "data": {
            "objectId": id,
            "version": "1",
            "digest": "objdigest",
            "type": format!("{PACKAGE_ID}::event::Event"),
            "content": {
                "dataType": "moveObject",
                "type": format!("{PACKAGE_ID}::event::Event"),
                "hasPublicTransfer": false,
                "fields": fields
            }
        }
    }))
}

/// `sui_getObject` for `id`.
pub fn get_object(id: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST")).and(body_partial_json(json!({
        "method": "sui_getObject",
        "params": [id],
    })))
}

/// `suix_queryEvents` for one contract event type.
pub fn query_events(event_name: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST")).and(body_partial_json(json!({
        "method": "suix_queryEvents",
        "params": [{ "MoveEventType": format!("{PACKAGE_ID}::event::{event_name}") }],
    })))
}

pub fn chain_event(event_name: &str, tx_digest: &str, payload: Value) -> Value {
    json!({
        "id": { "txDigest": tx_digest, "eventSeq": "0" },
        "packageId": PACKAGE_ID,
        "transactionModule": "event",
        "sender": address(0),
        "type": format!("{PACKAGE_ID}::event::{event_name}"),
        "parsedJson": payload,
        "timestampMs": "1700000001000"
    })
}

pub fn event_page(events: Vec<Value>) -> ResponseTemplate {
    rpc_ok(json!({
        "data": events,
        "nextCursor": null,
        "hasNextPage": false
    }))
}

pub async fn mount_object(server: &MockServer, id: &str, fields: Value) {
    get_object(id)
        .respond_with(object_response(id, fields))
        .mount(server)
        .await;
}

pub async fn mount_walrus_store(server: &MockServer, blob_id: &str) {
    Mock::given(method("PUT"))
        .and(path("/v1/store"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "newlyCreated": { "blobObject": { "blobId": blob_id } }
        })))
        .mount(server)
        .await;
}

/// A cached row, for tests that do not go through the chain.
pub fn record(n: u32) -> EventRecord {
    EventRecord {
        id: object_id(n),
        name: format!("Concert {n}"),
        description: "An evening of music".to_string(),
        venue: "Taipei Arena".to_string(),
        date: 4_000_000_000_000 + i64::from(n) * 1_000,
        organizer: ORGANIZER.to_string(),
        total_seats: 100,
        available_seats: 100,
        price_per_seat: 10,
        image_url: String::new(),
        is_active: true,
        created_at: 1_700_000_000_000 + i64::from(n),
        updated_at: 1_700_000_000_000 + i64::from(n),
    }
}

/// Resources wired against the mock servers and an in-memory database.
pub async fn resources(sui: &MockServer, walrus: &MockServer) -> ResourceManager {
    let mut config = Config::default();
    config.sui.rpc_url = sui.uri();
    config.sui.package_id = PACKAGE_ID.to_string();
    config.walrus.publisher_url = walrus.uri();
    config.walrus.aggregator_url = walrus.uri();

    let store = SqliteStore::open_in_memory().await.unwrap();
    ResourceManager::with_store(&config, store)
}
