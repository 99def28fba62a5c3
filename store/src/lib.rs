//! # SuiStage SQLite cache
//!
//! Local, query-friendly copy of on-chain event objects plus the contract
//! events observed for them. The chain stays authoritative: every row here
//! can be rebuilt by syncing again.
//!
//! Tables:
//!
//! - `events`: one row per event object, upserted by ID
//! - `event_transactions`: contract events, unique per `(tx_digest, event_type)`
//! - `seat_reservations`: purchases, used only for aggregates

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod activity;
pub mod error;
mod events;
mod maintenance;
pub mod models;
pub mod schema;
mod store;

pub use error::{Result, StoreError};
pub use maintenance::default_backup_path;
pub use models::{
    DatabaseStats, Event, EventFilter, EventPage, EventRecord, EventTransaction,
    NewEventTransaction, NewSeatReservation, PageRequest, ReservationStats, SeatReservation,
};
pub use store::{SqliteStore, StoreConfig};
