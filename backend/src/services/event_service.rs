//! Event service: chain sync and cached reads.
//!
//! Reads go straight to the SQLite cache. Sync operations fetch from the
//! Sui full node and upsert; the chain always wins.

use super::error::{Result, ServiceError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use suistage_store::{
    Event, EventFilter, EventPage, EventRecord, EventTransaction, NewEventTransaction,
    NewSeatReservation, PageRequest, ReservationStats, SeatReservation, SqliteStore,
};
use suistage_sui::{EventTypes, SuiClient, SuiEvent};

// ============================================================================
// Result Types
// ============================================================================

/// One item a batch sync could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    /// Event object the item referred to, when it could be read
    pub event_id: Option<String>,
    /// Transaction that emitted the chain event
    pub tx_digest: String,
    /// What went wrong
    pub error: String,
}

/// Per-item outcome of a batch sync.
///
/// Batch syncs are best effort: one bad item never aborts the rest, and
/// every item ends up either in `synced` or in `failures`. Replayed items
/// that were already ingested appear in neither.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport<T> {
    /// Rows written by this run
    pub synced: Vec<T>,
    /// Items that failed
    pub failures: Vec<SyncFailure>,
}

impl<T> Default for SyncReport<T> {
    fn default() -> Self {
        Self {
            synced: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// Seat and sales summary for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    /// Event object ID
    pub event_id: String,
    /// Event name
    pub event_name: String,
    /// Seats at creation
    pub total_seats: i64,
    /// Seats still for sale
    pub available_seats: i64,
    /// `total_seats - available_seats`
    pub sold_seats: i64,
    /// Sold share in percent, two decimals
    pub sold_percentage: f64,
    /// Aggregates over recorded reservations
    #[serde(flatten)]
    pub reservations: ReservationStats,
}

// ============================================================================
// Service
// ============================================================================

/// Orchestrates the SQLite cache and the Sui client.
///
/// Cheap to clone.
#[derive(Clone, Debug)]
pub struct EventService {
    store: SqliteStore,
    sui: Arc<SuiClient>,
    event_types: EventTypes,
}

impl EventService {
    /// Create a service for the contract published as `package_id`.
    #[must_use]
    pub fn new(store: SqliteStore, sui: Arc<SuiClient>, package_id: &str) -> Self {
        Self {
            store,
            sui,
            event_types: EventTypes::for_package(package_id),
        }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Contract event type names this service queries.
    #[must_use]
    pub const fn event_types(&self) -> &EventTypes {
        &self.event_types
    }

    // ------------------------------------------------------------------------
    // Sync
    // ------------------------------------------------------------------------

    /// Fetch an event object from chain and upsert it.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Chain`] if the RPC fails or the object is missing
    /// - [`ServiceError::InvalidEventData`] if a field is absent or malformed
    /// - [`ServiceError::Store`] if the upsert fails
    #[tracing::instrument(skip(self))]
    pub async fn sync_event_from_chain(&self, event_id: &str) -> Result<Event> {
        let object = self.sui.get_object(event_id).await?;
        let record = event_record_from_fields(event_id, object.move_fields()?)?;
        let event = self.store.upsert_event(&record).await?;

        metrics::counter!("suistage.sync.events").increment(1);
        tracing::info!(name = %event.name, "Event synced from chain");
        Ok(event)
    }

    /// Local row, or exactly one chain sync when it is not cached yet.
    ///
    /// # Errors
    ///
    /// Same as [`sync_event_from_chain`](Self::sync_event_from_chain) on a miss.
    pub async fn get_or_sync_event(&self, event_id: &str) -> Result<Event> {
        if let Some(event) = self.store.get_event(event_id).await? {
            return Ok(event);
        }

        tracing::debug!(event_id, "Event not cached, syncing from chain");
        self.sync_event_from_chain(event_id).await
    }

    /// Sync the events referenced by the newest `limit` `EventCreated`
    /// chain events, one at a time.
    ///
    /// Each observation is also recorded as an event transaction.
    ///
    /// # Errors
    ///
    /// Only the event query itself can fail the call; per-item failures are
    /// reported in the returned [`SyncReport`].
    pub async fn sync_recent_events(&self, limit: usize) -> Result<SyncReport<Event>> {
        let chain_events = self
            .sui
            .query_recent_events(&self.event_types.event_created, limit)
            .await?;

        let mut report = SyncReport::default();
        for chain_event in &chain_events {
            let event_id = payload_event_id(chain_event);
            match self.ingest_created(chain_event, event_id.as_deref()).await {
                Ok(event) => report.synced.push(event),
                Err(e) => {
                    tracing::warn!(
                        event_id = event_id.as_deref().unwrap_or("-"),
                        tx_digest = %chain_event.id.tx_digest,
                        error = %e,
                        "Failed to sync event"
                    );
                    metrics::counter!("suistage.sync.failures", "kind" => "event").increment(1);
                    report.failures.push(SyncFailure {
                        event_id,
                        tx_digest: chain_event.id.tx_digest.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            synced = report.synced.len(),
            failed = report.failures.len(),
            "Recent events synced"
        );
        Ok(report)
    }

    async fn ingest_created(&self, chain_event: &SuiEvent, event_id: Option<&str>) -> Result<Event> {
        let event_id = event_id.ok_or_else(|| {
            ServiceError::invalid_event(&chain_event.id.tx_digest, "payload has no event_id")
        })?;

        let event = self.sync_event_from_chain(event_id).await?;
        self.record_event_transaction(&observation(chain_event, event_id))
            .await?;
        Ok(event)
    }

    /// Ingest the newest `limit` `SeatsReserved` chain events.
    ///
    /// The referenced event is synced first when it is not cached. The
    /// transaction and its reservation are written together, and only when
    /// the transaction was not seen before: running this twice never double
    /// counts, and a failed write is retried by the next run.
    ///
    /// # Errors
    ///
    /// Only the event query itself can fail the call; per-item failures are
    /// reported in the returned [`SyncReport`].
    pub async fn sync_recent_reservations(
        &self,
        limit: usize,
    ) -> Result<SyncReport<SeatReservation>> {
        let chain_events = self
            .sui
            .query_recent_events(&self.event_types.seats_reserved, limit)
            .await?;

        let mut report = SyncReport::default();
        for chain_event in &chain_events {
            match self.ingest_reservation(chain_event).await {
                Ok(Some(reservation)) => report.synced.push(reservation),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        tx_digest = %chain_event.id.tx_digest,
                        error = %e,
                        "Failed to ingest reservation"
                    );
                    metrics::counter!("suistage.sync.failures", "kind" => "reservation")
                        .increment(1);
                    report.failures.push(SyncFailure {
                        event_id: payload_event_id(chain_event),
                        tx_digest: chain_event.id.tx_digest.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            recorded = report.synced.len(),
            failed = report.failures.len(),
            "Recent reservations synced"
        );
        Ok(report)
    }

    async fn ingest_reservation(&self, chain_event: &SuiEvent) -> Result<Option<SeatReservation>> {
        let digest = &chain_event.id.tx_digest;
        let payload = chain_event
            .parsed_json
            .as_object()
            .ok_or_else(|| ServiceError::invalid_event(digest, "payload is not an object"))?;

        let event_id = string_field(digest, payload, "event_id")?;
        let buyer = payload
            .get("buyer")
            .and_then(Value::as_str)
            .unwrap_or(&chain_event.sender)
            .to_string();
        let seat_count = integer_field(digest, payload, "seat_count")?;
        let total_price = integer_field(digest, payload, "total_price")?;

        self.get_or_sync_event(&event_id).await?;

        let tx = observation(chain_event, &event_id);
        let reservation = NewSeatReservation {
            event_id,
            buyer,
            seat_count,
            total_price,
            tx_digest: digest.clone(),
            reserved_at: tx.timestamp,
        };

        let recorded = self.store.record_reservation_once(&tx, &reservation).await?;
        if recorded.is_some() {
            metrics::counter!("suistage.sync.reservations").increment(1);
        }
        Ok(recorded)
    }

    // ------------------------------------------------------------------------
    // Activity
    // ------------------------------------------------------------------------

    /// Record a contract event observation. `None` if it was already recorded.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`]; a foreign-key violation means the
    /// referenced event is not cached.
    pub async fn record_event_transaction(
        &self,
        tx: &NewEventTransaction,
    ) -> Result<Option<EventTransaction>> {
        Ok(self.store.record_transaction(tx).await?)
    }

    /// Append a seat reservation.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`]; a foreign-key violation means the
    /// referenced event is not cached.
    pub async fn record_seat_reservation(
        &self,
        reservation: &NewSeatReservation,
    ) -> Result<SeatReservation> {
        let row = self.store.record_reservation(reservation).await?;
        metrics::counter!("suistage.sync.reservations").increment(1);
        Ok(row)
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Filtered, paginated listing, latest date first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the query fails.
    pub async fn list_events(&self, filter: &EventFilter, page: PageRequest) -> Result<EventPage> {
        Ok(self.store.list_events(filter, page).await?)
    }

    /// Case-insensitive search on name and venue.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the query fails.
    pub async fn search_events(&self, query: &str, page: PageRequest) -> Result<EventPage> {
        let filter = EventFilter {
            search: Some(query.to_string()),
            ..EventFilter::default()
        };
        self.list_events(&filter, page).await
    }

    /// Events created by `organizer`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the query fails.
    pub async fn events_by_organizer(&self, organizer: &str) -> Result<Vec<Event>> {
        Ok(self.store.events_by_organizer(organizer).await?)
    }

    /// Active events that have not started yet, soonest first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the query fails.
    pub async fn upcoming_events(&self, limit: u32) -> Result<Vec<Event>> {
        Ok(self.store.upcoming_events(limit, now_millis()).await?)
    }

    /// Seat and sales summary of a cached event.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] if the event is not cached
    /// - [`ServiceError::Store`] if a query fails
    pub async fn event_stats(&self, event_id: &str) -> Result<EventStats> {
        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Event not found".to_string()))?;
        let reservations = self.store.event_stats(event_id).await?;

        Ok(EventStats {
            sold_seats: event.sold_seats(),
            sold_percentage: sold_percentage(event.sold_seats(), event.total_seats),
            event_id: event.id,
            event_name: event.name,
            total_seats: event.total_seats,
            available_seats: event.available_seats,
            reservations,
        })
    }
}

// ============================================================================
// Field Coercion
// ============================================================================

/// Build an upsert record from the Move fields of an event object.
///
/// Move `u64` values arrive as decimal strings, smaller integers as JSON
/// numbers; both are accepted. `is_active` may be a bool or `"true"`/`"false"`.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidEventData`] naming the first missing or
/// malformed field.
pub fn event_record_from_fields(event_id: &str, fields: &Map<String, Value>) -> Result<EventRecord> {
    Ok(EventRecord {
        id: event_id.to_string(),
        name: string_field(event_id, fields, "name")?,
        description: string_field(event_id, fields, "description")?,
        venue: string_field(event_id, fields, "venue")?,
        date: integer_field(event_id, fields, "date")?,
        organizer: string_field(event_id, fields, "organizer")?,
        total_seats: integer_field(event_id, fields, "total_seats")?,
        available_seats: integer_field(event_id, fields, "available_seats")?,
        price_per_seat: integer_field(event_id, fields, "price_per_seat")?,
        image_url: string_field(event_id, fields, "image_url")?,
        is_active: bool_field(event_id, fields, "is_active")?,
        created_at: integer_field(event_id, fields, "created_at")?,
        updated_at: integer_field(event_id, fields, "updated_at")?,
    })
}

fn field<'a>(id: &str, fields: &'a Map<String, Value>, name: &str) -> Result<&'a Value> {
    fields
        .get(name)
        .ok_or_else(|| ServiceError::invalid_event(id, format!("missing field `{name}`")))
}

fn string_field(id: &str, fields: &Map<String, Value>, name: &str) -> Result<String> {
    field(id, fields, name)?
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| ServiceError::invalid_event(id, format!("field `{name}` is not a string")))
}

/// Integers are stored as SQLite `INTEGER`, so Move `u64` values above
/// `i64::MAX` are rejected rather than wrapped.
fn integer_field(id: &str, fields: &Map<String, Value>, name: &str) -> Result<i64> {
    let value = field(id, fields, name)?;
    let (signed, unsigned) = match value {
        Value::Number(n) => (n.as_i64(), n.as_u64()),
        Value::String(s) => (s.trim().parse().ok(), s.trim().parse::<u64>().ok()),
        _ => (None, None),
    };

    match (signed, unsigned) {
        (Some(n), _) => Ok(n),
        (None, Some(_)) => Err(ServiceError::invalid_event(
            id,
            format!("field `{name}` exceeds the supported range (i64::MAX): {value}"),
        )),
        (None, None) => Err(ServiceError::invalid_event(
            id,
            format!("field `{name}` is not an integer: {value}"),
        )),
    }
}

fn bool_field(id: &str, fields: &Map<String, Value>, name: &str) -> Result<bool> {
    match field(id, fields, name)? {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s == "true" => Ok(true),
        Value::String(s) if s == "false" => Ok(false),
        other => Err(ServiceError::invalid_event(
            id,
            format!("field `{name}` is not a boolean: {other}"),
        )),
    }
}

fn payload_event_id(chain_event: &SuiEvent) -> Option<String> {
    chain_event
        .parsed_json
        .get("event_id")
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn observation(chain_event: &SuiEvent, event_id: &str) -> NewEventTransaction {
    NewEventTransaction {
        event_id: Some(event_id.to_string()),
        tx_digest: chain_event.id.tx_digest.clone(),
        event_type: chain_event.type_.clone(),
        sender: chain_event.sender.clone(),
        timestamp: chain_event.timestamp_millis().unwrap_or_else(now_millis),
        data: chain_event.parsed_json.clone(),
    }
}

/// `sold / total` in percent, rounded to two decimals. Zero seats is 0%.
#[allow(clippy::cast_precision_loss)]
fn sold_percentage(sold: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let percent = sold as f64 / total as f64 * 100.0;
    (percent * 100.0).round() / 100.0
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn move_fields() -> Map<String, Value> {
        json!({
            "id": { "id": "0xabc" },
            "name": "Sui Summit",
            "description": "Builders meetup",
            "venue": "Lisbon",
            "date": "1900000000000",
            "organizer": "0xorg",
            "total_seats": "100",
            "available_seats": 40,
            "price_per_seat": "1000000000",
            "image_url": "",
            "is_active": true,
            "created_at": "1700000000000",
            "updated_at": "1700000000500"
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[test]
    fn test_coerces_strings_and_numbers() {
        let record = event_record_from_fields("0xabc", &move_fields()).unwrap();

        assert_eq!(record.id, "0xabc");
        assert_eq!(record.date, 1_900_000_000_000);
        assert_eq!(record.total_seats, 100);
        assert_eq!(record.available_seats, 40);
        assert_eq!(record.price_per_seat, 1_000_000_000);
        assert!(record.is_active);
    }

    #[test]
    fn test_bool_as_string() {
        let mut fields = move_fields();
        fields.insert("is_active".into(), json!("false"));

        assert!(!event_record_from_fields("0xabc", &fields).unwrap().is_active);
    }

    #[test]
    fn test_missing_field_is_invalid_data() {
        let mut fields = move_fields();
        fields.remove("venue");

        let err = event_record_from_fields("0xabc", &fields).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidEventData { ref reason, .. } if reason.contains("venue")
        ));
    }

    #[test]
    fn test_malformed_number_is_invalid_data() {
        let mut fields = move_fields();
        fields.insert("total_seats".into(), json!("lots"));

        assert!(matches!(
            event_record_from_fields("0xabc", &fields),
            Err(ServiceError::InvalidEventData { .. })
        ));
    }

    #[test]
    fn test_u64_above_i64_range_is_rejected() {
        let mut fields = move_fields();
        fields.insert("price_per_seat".into(), json!(u64::MAX.to_string()));

        let err = event_record_from_fields("0xabc", &fields).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidEventData { ref reason, .. }
                if reason.contains("price_per_seat") && reason.contains("exceeds")
        ));

        fields.insert("price_per_seat".into(), json!(i64::MAX.to_string()));
        let record = event_record_from_fields("0xabc", &fields).unwrap();
        assert_eq!(record.price_per_seat, i64::MAX);
    }

    #[test]
    fn test_sold_percentage() {
        assert_eq!(sold_percentage(60, 100), 60.0);
        assert_eq!(sold_percentage(1, 3), 33.33);
        assert_eq!(sold_percentage(2, 3), 66.67);
        assert_eq!(sold_percentage(0, 0), 0.0);
    }

    #[test]
    fn test_stats_serialize_flat() {
        let stats = EventStats {
            event_id: "0xabc".into(),
            event_name: "Sui Summit".into(),
            total_seats: 100,
            available_seats: 94,
            sold_seats: 6,
            sold_percentage: 6.0,
            reservations: ReservationStats {
                tickets_sold: 6,
                total_revenue: 60,
                unique_buyers: 2,
            },
        };
        let body = serde_json::to_value(stats).unwrap();

        assert_eq!(body["eventId"], "0xabc");
        assert_eq!(body["soldSeats"], 6);
        assert_eq!(body["ticketsSold"], 6);
        assert_eq!(body["uniqueBuyers"], 2);
    }

    proptest! {
        #[test]
        fn integers_accepted_as_number_or_string(n in 0..i64::MAX) {
            let fields = json!({ "as_number": n, "as_string": n.to_string() });
            let fields = fields.as_object().unwrap();

            prop_assert_eq!(integer_field("0x1", fields, "as_number").unwrap(), n);
            prop_assert_eq!(integer_field("0x1", fields, "as_string").unwrap(), n);
        }
    }
}
