//! HTTP server module.
//!
//! This module provides the Axum-based HTTP server with:
//! - Application state management
//! - Health and API info endpoints
//! - Router configuration

pub mod health;
pub mod routes;
pub mod state;

pub use health::{api_info, health_check};
pub use routes::build_router;
pub use state::AppState;
