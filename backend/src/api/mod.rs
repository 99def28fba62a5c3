//! REST API handlers.

pub mod error;
pub mod events;
