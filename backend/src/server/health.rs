//! Health check and API info endpoints.

use super::state::AppState;
use axum::{Json, extract::State};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests
    pub status: &'static str,
    /// Current time, RFC 3339
    pub timestamp: String,
    /// Seconds since the server started
    pub uptime: f64,
    /// Deployment environment
    pub environment: String,
}

/// Health check endpoint.
///
/// A liveness check only: it does not touch the database or the chain.
///
/// # Example
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"status":"ok","timestamp":"2025-01-01T00:00:00+00:00","uptime":12.5,"environment":"development"}
/// ```
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        environment: state.config.server.environment.clone(),
    })
}

/// Endpoint index.
#[derive(Debug, Serialize)]
pub struct Endpoints {
    /// Event resource root
    pub events: &'static str,
    /// Health check
    pub health: &'static str,
}

/// API info response.
#[derive(Debug, Serialize)]
pub struct ApiInfo {
    /// Service name
    pub name: &'static str,
    /// Crate version
    pub version: &'static str,
    /// Where to find things
    pub endpoints: Endpoints,
}

/// API info endpoint.
///
/// # Example
///
/// ```bash
/// curl http://localhost:3000/
/// # {"name":"SuiStage Event Management API","version":"0.1.0","endpoints":{...}}
/// ```
pub async fn api_info() -> Json<ApiInfo> {
    Json(ApiInfo {
        name: "SuiStage Event Management API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            events: "/api/events",
            health: "/health",
        },
    })
}
