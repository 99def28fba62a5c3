//! Axum building blocks for the SuiStage HTTP API.
//!
//! Handlers in the server crate stay thin: they validate input with
//! [`Validator`], call a service, and wrap the result in [`ApiResponse`].
//! Failures become [`AppError`], which renders the same envelope with
//! `success: false`.
//!
//! # Example
//!
//! ```ignore
//! use suistage_web::{ApiResponse, AppError, Validator, WebResult};
//!
//! async fn upcoming(
//!     State(state): State<AppState>,
//!     Query(query): Query<UpcomingQuery>,
//! ) -> WebResult<ApiResponse<Vec<Event>>> {
//!     let mut v = Validator::new();
//!     let limit = v.integer("limit", query.limit.as_deref(), 10, 1, 100);
//!     v.finish()?;
//!
//!     let events = state.service.upcoming_events(limit).await?;
//!     let count = events.len();
//!     Ok(ApiResponse::ok(events).with_count(count))
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod validation;

pub use error::{AppError, FieldError};
pub use extractors::{ClientIp, CorrelationId, UserAgent};
pub use middleware::{CORRELATION_ID_HEADER, CorrelationIdExt, correlation_id_layer};
pub use response::{ApiResponse, Pagination};
pub use validation::{Validator, is_valid_object_id, validate_address, validate_object_id};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
