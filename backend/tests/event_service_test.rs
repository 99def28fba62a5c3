//! Integration tests for `EventService` against a mock Sui node.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::*;
use serde_json::json;
use suistage_backend::ServiceError;
use suistage_store::{EventFilter, PageRequest};
use wiremock::MockServer;

#[tokio::test]
async fn test_cache_miss_syncs_exactly_once() {
    let sui = MockServer::start().await;
    let walrus = MockServer::start().await;
    let id = object_id(1);

    get_object(&id)
        .respond_with(object_response(&id, event_fields("Sui Summit", 100, 40)))
        .expect(1)
        .mount(&sui)
        .await;

    let service = resources(&sui, &walrus).await.service;

    let first = service.get_or_sync_event(&id).await.unwrap();
    let second = service.get_or_sync_event(&id).await.unwrap();

    assert_eq!(first.id, id);
    assert_eq!(first.name, "Sui Summit");
    assert_eq!(first.available_seats, 40);
    assert_eq!(second.name, first.name);
}

#[tokio::test]
async fn test_resync_overwrites_mutable_fields_only() {
    let sui = MockServer::start().await;
    let walrus = MockServer::start().await;
    let id = object_id(2);

    get_object(&id)
        .respond_with(object_response(&id, event_fields("Before", 100, 40)))
        .up_to_n_times(1)
        .mount(&sui)
        .await;
    get_object(&id)
        .respond_with(object_response(&id, event_fields("After", 999, 30)))
        .mount(&sui)
        .await;

    let service = resources(&sui, &walrus).await.service;

    service.sync_event_from_chain(&id).await.unwrap();
    let event = service.sync_event_from_chain(&id).await.unwrap();

    assert_eq!(event.name, "After");
    assert_eq!(event.available_seats, 30);
    assert_eq!(event.total_seats, 100);

    let page = service
        .list_events(&EventFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_missing_object_is_chain_not_found() {
    let sui = MockServer::start().await;
    let walrus = MockServer::start().await;
    let id = object_id(3);

    get_object(&id)
        .respond_with(rpc_ok(json!({
            "error": { "code": "notExists", "object_id": id }
        })))
        .mount(&sui)
        .await;

    let service = resources(&sui, &walrus).await.service;
    let err = service.get_or_sync_event(&id).await.unwrap_err();

    assert!(matches!(err, ServiceError::Chain(ref e) if e.is_not_found()));
}

#[tokio::test]
async fn test_object_without_event_fields_is_invalid() {
    let sui = MockServer::start().await;
    let walrus = MockServer::start().await;
    let id = object_id(4);

    mount_object(&sui, &id, json!({ "id": { "id": id }, "balance": "5" })).await;

    let service = resources(&sui, &walrus).await.service;
    let err = service.sync_event_from_chain(&id).await.unwrap_err();

    assert!(matches!(err, ServiceError::InvalidEventData { .. }));
}

#[tokio::test]
async fn test_sync_recent_events_reports_each_item() {
    let sui = MockServer::start().await;
    let walrus = MockServer::start().await;
    let (a, b, gone) = (object_id(10), object_id(11), object_id(12));

    query_events("EventCreated")
        .respond_with(event_page(vec![
            chain_event("EventCreated", "TX_A", json!({ "event_id": a })),
            chain_event("EventCreated", "TX_NO_ID", json!({ "name": "orphan" })),
            chain_event("EventCreated", "TX_B", json!({ "event_id": b })),
            chain_event("EventCreated", "TX_GONE", json!({ "event_id": gone })),
        ]))
        .mount(&sui)
        .await;
    mount_object(&sui, &a, event_fields("A", 10, 10)).await;
    mount_object(&sui, &b, event_fields("B", 10, 10)).await;
    get_object(&gone)
        .respond_with(rpc_ok(json!({ "error": { "code": "deleted", "object_id": gone } })))
        .mount(&sui)
        .await;

    let resources = resources(&sui, &walrus).await;
    let report = resources.service.sync_recent_events(50).await.unwrap();

    let synced: Vec<_> = report.synced.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(synced, vec!["A", "B"]);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].event_id, None);
    assert_eq!(report.failures[0].tx_digest, "TX_NO_ID");
    assert_eq!(report.failures[1].event_id.as_deref(), Some(gone.as_str()));

    let observed = resources.store.transactions_for_event(&a).await.unwrap();
    assert_eq!(observed.len(), 1);
    assert_eq!(observed[0].tx_digest, "TX_A");
}

#[tokio::test]
async fn test_resyncing_recent_events_records_transactions_once() {
    let sui = MockServer::start().await;
    let walrus = MockServer::start().await;
    let a = object_id(20);

    query_events("EventCreated")
        .respond_with(event_page(vec![chain_event(
            "EventCreated",
            "TX_A",
            json!({ "event_id": a }),
        )]))
        .mount(&sui)
        .await;
    mount_object(&sui, &a, event_fields("A", 10, 10)).await;

    let resources = resources(&sui, &walrus).await;
    resources.service.sync_recent_events(10).await.unwrap();
    let again = resources.service.sync_recent_events(10).await.unwrap();

    assert_eq!(again.synced.len(), 1);
    assert!(again.failures.is_empty());
    assert_eq!(resources.store.transactions_for_event(&a).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_reservations_are_never_double_counted() {
    let sui = MockServer::start().await;
    let walrus = MockServer::start().await;
    let event = object_id(30);
    let (alice, bob) = (address(1), address(2));

    query_events("SeatsReserved")
        .respond_with(event_page(vec![
            chain_event(
                "SeatsReserved",
                "TX_1",
                json!({ "event_id": event, "buyer": alice, "seat_count": "1", "total_price": "10" }),
            ),
            chain_event(
                "SeatsReserved",
                "TX_2",
                json!({ "event_id": event, "buyer": alice, "seat_count": 2, "total_price": 20 }),
            ),
            chain_event(
                "SeatsReserved",
                "TX_3",
                json!({ "event_id": event, "buyer": bob, "seat_count": "3", "total_price": "30" }),
            ),
        ]))
        .mount(&sui)
        .await;
    // The event is not cached yet; it must be fetched once and then reused
    get_object(&event)
        .respond_with(object_response(&event, event_fields("Gig", 100, 94)))
        .expect(1)
        .mount(&sui)
        .await;

    let service = resources(&sui, &walrus).await.service;

    let first = service.sync_recent_reservations(50).await.unwrap();
    let second = service.sync_recent_reservations(50).await.unwrap();

    assert_eq!(first.synced.len(), 3);
    assert!(first.failures.is_empty());
    assert!(second.synced.is_empty());
    assert!(second.failures.is_empty());

    let stats = service.event_stats(&event).await.unwrap();
    assert_eq!(stats.reservations.tickets_sold, 6);
    assert_eq!(stats.reservations.total_revenue, 60);
    assert_eq!(stats.reservations.unique_buyers, 2);
    assert_eq!(stats.sold_seats, 6);
    assert!((stats.sold_percentage - 6.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_malformed_reservation_is_reported() {
    let sui = MockServer::start().await;
    let walrus = MockServer::start().await;
    let event = object_id(31);

    query_events("SeatsReserved")
        .respond_with(event_page(vec![chain_event(
            "SeatsReserved",
            "TX_BAD",
            json!({ "event_id": event, "seat_count": "many", "total_price": "1" }),
        )]))
        .mount(&sui)
        .await;

    let service = resources(&sui, &walrus).await.service;
    let report = service.sync_recent_reservations(50).await.unwrap();

    assert!(report.synced.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].event_id.as_deref(), Some(event.as_str()));
}

#[tokio::test]
async fn test_failed_reservation_is_ingested_on_next_run() {
    let sui = MockServer::start().await;
    let walrus = MockServer::start().await;
    let event = object_id(32);

    query_events("SeatsReserved")
        .respond_with(event_page(vec![chain_event(
            "SeatsReserved",
            "TX_RETRY",
            json!({ "event_id": event, "buyer": address(1), "seat_count": "2", "total_price": "20" }),
        )]))
        .mount(&sui)
        .await;
    mount_object(&sui, &event, event_fields("Gig", 100, 98)).await;

    let resources = resources(&sui, &walrus).await;
    let pool = resources.store.pool();

    sqlx::query(
        "CREATE TRIGGER reject_reservations BEFORE INSERT ON seat_reservations \
         BEGIN SELECT RAISE(ABORT, 'reservations unavailable'); END",
    )
    .execute(pool)
    .await
    .unwrap();

    let first = resources.service.sync_recent_reservations(50).await.unwrap();
    assert!(first.synced.is_empty());
    assert_eq!(first.failures.len(), 1);

    sqlx::query("DROP TRIGGER reject_reservations")
        .execute(pool)
        .await
        .unwrap();

    let retry = resources.service.sync_recent_reservations(50).await.unwrap();
    assert_eq!(retry.synced.len(), 1);
    assert!(retry.failures.is_empty());

    let stats = resources.service.event_stats(&event).await.unwrap();
    assert_eq!(stats.reservations.tickets_sold, 2);
    assert_eq!(stats.reservations.total_revenue, 20);
}

#[tokio::test]
async fn test_stats_for_unknown_event_is_not_found() {
    let sui = MockServer::start().await;
    let walrus = MockServer::start().await;

    let service = resources(&sui, &walrus).await.service;
    let err = service.event_stats(&object_id(99)).await.unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Event not found"));
    assert!(sui.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reads_come_from_cache() {
    let sui = MockServer::start().await;
    let walrus = MockServer::start().await;
    let resources = resources(&sui, &walrus).await;

    let mut past = record(1);
    past.date = 1_000;
    resources.store.upsert_event(&past).await.unwrap();
    resources.store.upsert_event(&record(2)).await.unwrap();
    resources.store.upsert_event(&record(3)).await.unwrap();

    let upcoming = resources.service.upcoming_events(10).await.unwrap();
    let ids: Vec<_> = upcoming.iter().map(|e| e.id.clone()).collect();
    assert_eq!(ids, vec![object_id(2), object_id(3)]);

    let found = resources
        .service
        .search_events("concert 3", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(found.total, 1);

    let mine = resources.service.events_by_organizer(ORGANIZER).await.unwrap();
    assert_eq!(mine.len(), 3);
    assert!(sui.received_requests().await.unwrap().is_empty());
}
