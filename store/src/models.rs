//! Row types and query parameters.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;

/// A cached on-chain event (the ticketed kind, not a Move event).
///
/// Move `u64` quantities are held as `i64`; values above `i64::MAX` are
/// refused at sync time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    /// On-chain object ID
    pub id: String,
    /// Event name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Venue name
    pub venue: String,
    /// Event start, epoch millis
    pub date: i64,
    /// Organizer address
    pub organizer: String,
    /// Seats at creation
    pub total_seats: i64,
    /// Seats still for sale
    pub available_seats: i64,
    /// Price per seat in MIST
    pub price_per_seat: i64,
    /// Image URL (usually a Walrus aggregator link)
    pub image_url: String,
    /// Whether sales are open
    pub is_active: bool,
    /// Creation time on chain, epoch millis
    pub created_at: i64,
    /// Last update on chain, epoch millis
    pub updated_at: i64,
    /// Last time this row was written from chain, epoch millis
    pub synced_at: i64,
}

impl Event {
    /// Seats no longer available.
    ///
    /// Saturates at zero: the chain does not guarantee
    /// `available_seats <= total_seats` and neither does this cache.
    #[must_use]
    pub const fn sold_seats(&self) -> i64 {
        let sold = self.total_seats - self.available_seats;
        if sold < 0 { 0 } else { sold }
    }
}

/// Event state read from chain, ready to be upserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// On-chain object ID
    pub id: String,
    /// Event name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Venue name
    pub venue: String,
    /// Event start, epoch millis
    pub date: i64,
    /// Organizer address
    pub organizer: String,
    /// Seats at creation
    pub total_seats: i64,
    /// Seats still for sale
    pub available_seats: i64,
    /// Price per seat in MIST
    pub price_per_seat: i64,
    /// Image URL
    pub image_url: String,
    /// Whether sales are open
    pub is_active: bool,
    /// Creation time on chain, epoch millis
    pub created_at: i64,
    /// Last update on chain, epoch millis
    pub updated_at: i64,
}

/// Raw observation of a contract event inside a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventTransaction {
    /// Row ID
    pub id: i64,
    /// Event object the observation refers to
    pub event_id: Option<String>,
    /// Transaction digest
    pub tx_digest: String,
    /// Fully-qualified Move event type
    pub event_type: String,
    /// Transaction sender
    pub sender: String,
    /// Checkpoint timestamp, epoch millis
    pub timestamp: i64,
    /// Event payload
    pub data: Json<Value>,
    /// Insert time, epoch millis
    pub created_at: i64,
}

/// Insert parameters for [`EventTransaction`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewEventTransaction {
    /// Event object the observation refers to
    pub event_id: Option<String>,
    /// Transaction digest
    pub tx_digest: String,
    /// Fully-qualified Move event type
    pub event_type: String,
    /// Transaction sender
    pub sender: String,
    /// Checkpoint timestamp, epoch millis
    pub timestamp: i64,
    /// Event payload
    pub data: Value,
}

/// A seat purchase, kept only for aggregate statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SeatReservation {
    /// Row ID
    pub id: i64,
    /// Event object
    pub event_id: String,
    /// Buyer address
    pub buyer: String,
    /// Seats bought
    pub seat_count: i64,
    /// Amount paid in MIST
    pub total_price: i64,
    /// Transaction digest
    pub tx_digest: String,
    /// Reservation time, epoch millis
    pub reserved_at: i64,
    /// Insert time, epoch millis
    pub created_at: i64,
}

/// Insert parameters for [`SeatReservation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSeatReservation {
    /// Event object
    pub event_id: String,
    /// Buyer address
    pub buyer: String,
    /// Seats bought
    pub seat_count: i64,
    /// Amount paid in MIST
    pub total_price: i64,
    /// Transaction digest
    pub tx_digest: String,
    /// Reservation time, epoch millis
    pub reserved_at: i64,
}

/// Filters for [`SqliteStore::list_events`](crate::SqliteStore::list_events).
///
/// All present filters are combined with `AND`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Case-insensitive substring of name or venue
    pub search: Option<String>,
    /// Exact organizer address
    pub organizer: Option<String>,
    /// Active flag
    pub is_active: Option<bool>,
    /// Only events whose `date` is after this instant (epoch millis)
    pub upcoming_after: Option<i64>,
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number, starting at 1
    pub page: u32,
    /// Rows per page
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl PageRequest {
    /// Rows to skip.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

/// One page of events plus the total match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPage {
    /// Rows on this page
    pub events: Vec<Event>,
    /// Page number, starting at 1
    pub page: u32,
    /// Rows per page
    pub limit: u32,
    /// Rows matching the filter across all pages
    pub total: i64,
}

impl EventPage {
    /// `ceil(total / limit)`, zero when nothing matches.
    #[must_use]
    pub fn total_pages(&self) -> i64 {
        if self.limit == 0 {
            return 0;
        }
        let limit = i64::from(self.limit);
        (self.total + limit - 1) / limit
    }
}

/// Aggregates over an event's seat reservations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationStats {
    /// Sum of `seat_count`
    pub tickets_sold: i64,
    /// Sum of `total_price`
    pub total_revenue: i64,
    /// Distinct buyers
    pub unique_buyers: i64,
}

/// Row counts and size of the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    /// Rows in `events`
    pub events: i64,
    /// Rows in `event_transactions`
    pub transactions: i64,
    /// Rows in `seat_reservations`
    pub reservations: i64,
    /// `page_count * page_size`
    pub size_bytes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest { page: 1, limit: 10 }.offset(), 0);
        assert_eq!(PageRequest { page: 3, limit: 25 }.offset(), 50);
        assert_eq!(PageRequest { page: 0, limit: 10 }.offset(), 0);
    }

    #[test]
    fn test_total_pages() {
        let page = |total, limit| EventPage {
            events: Vec::new(),
            page: 1,
            limit,
            total,
        };
        assert_eq!(page(15, 10).total_pages(), 2);
        assert_eq!(page(20, 10).total_pages(), 2);
        assert_eq!(page(0, 10).total_pages(), 0);
        assert_eq!(page(1, 100).total_pages(), 1);
    }
}
