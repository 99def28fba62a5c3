//! Service layer.

pub mod error;
pub mod event_service;

pub use error::ServiceError;
pub use event_service::{
    EventService, EventStats, SyncFailure, SyncReport, event_record_from_fields,
};
