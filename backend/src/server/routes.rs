//! Router configuration.
//!
//! Builds the complete Axum router with all endpoints.

use super::health::{api_info, health_check};
use super::state::AppState;
use crate::api::events;
use crate::config::Config;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, header},
    routing::{get, post},
};
use suistage_web::{AppError, correlation_id_layer};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and headers on top of the image itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Build the complete Axum router.
///
/// - `/health` and `/` (no `/api` prefix)
/// - event endpoints under `/api/events`
/// - a JSON 404 for everything else
///
/// Every request passes through correlation ID tracking, request logging,
/// CORS and the `tower-http` trace layer.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.walrus.max_image_bytes().saturating_add(MULTIPART_OVERHEAD);
    let cors = cors_layer(&state.config);

    let api_routes = Router::new()
        // Cached reads
        .route("/events", get(events::list_events))
        .route("/events/upcoming", get(events::upcoming_events))
        .route("/events/search", get(events::search_events))
        .route("/events/organizer/:address", get(events::events_by_organizer))
        .route("/events/:id", get(events::get_event))
        .route("/events/:id/stats", get(events::event_stats))
        // Uploads
        .route(
            "/events/upload-image",
            post(events::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Chain sync
        .route("/events/sync-recent", post(events::sync_recent_events))
        .route("/events/sync-reservations", post(events::sync_recent_reservations))
        .route("/events/:id/sync", post(events::sync_event));

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(api_info))
        .nest("/api", api_routes)
        .fallback(route_not_found)
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn route_not_found() -> AppError {
    AppError::not_found("Route not found")
}

fn cors_layer(config: &Config) -> CorsLayer {
    // A wildcard cannot be combined with credentials
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-correlation-id"),
        ])
        .expose_headers([HeaderName::from_static("x-correlation-id")])
        .allow_credentials(true)
}
