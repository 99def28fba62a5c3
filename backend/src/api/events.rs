//! Event API endpoints.
//!
//! Reads served from the SQLite cache:
//! - GET /api/events - List events with pagination and filters
//! - GET /api/events/upcoming - Active events that have not started
//! - GET /api/events/search - Search by name or venue
//! - GET /api/events/organizer/:address - Events of one organizer
//! - GET /api/events/:id - Event details (synced from chain on a miss)
//! - GET /api/events/:id/stats - Seat and sales summary
//!
//! Writes:
//! - POST /api/events/upload-image - Store an image on Walrus
//! - POST /api/events/:id/sync - Re-sync one event from chain
//! - POST /api/events/sync-recent - Sync recently created events
//! - POST /api/events/sync-reservations - Ingest recent seat reservations

use crate::server::state::AppState;
use crate::services::{EventStats, ServiceError};
use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use suistage_store::{Event, EventFilter, EventPage, PageRequest, SeatReservation};
use suistage_walrus::is_allowed_mime_type;
use suistage_web::{
    ApiResponse, AppError, ClientIp, CorrelationId, Pagination, UserAgent, Validator, WebResult,
    validate_address, validate_object_id,
};

const MAX_LIMIT: u32 = 100;
const DEFAULT_SYNC_LIMIT: u32 = 50;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing events.
///
/// Everything arrives as text and is checked with [`Validator`], so a bad
/// value gets the JSON error envelope.
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    /// Page number, from 1 (default: 1)
    pub page: Option<String>,
    /// Page size, 1 to 100 (default: 10)
    pub limit: Option<String>,
    /// Substring of name or venue
    pub search: Option<String>,
    /// Organizer address
    pub organizer: Option<String>,
    /// Active flag
    pub is_active: Option<String>,
    /// Only events that have not started
    pub upcoming: Option<String>,
}

/// Query parameters for search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Search term (required)
    pub q: Option<String>,
    /// Page number, from 1
    pub page: Option<String>,
    /// Page size, 1 to 100
    pub limit: Option<String>,
}

/// A bare `limit` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    /// Number of items
    pub limit: Option<String>,
}

/// Response after an image upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    /// Walrus blob ID
    pub blob_id: String,
    /// Aggregator URL serving the blob
    pub image_url: String,
}

fn paginated(result: EventPage) -> ApiResponse<Vec<Event>> {
    let pagination = Pagination {
        page: result.page,
        limit: result.limit,
        total: result.total,
        total_pages: result.total_pages(),
    };
    ApiResponse::ok(result.events).with_pagination(pagination)
}

fn sync_limit(raw: Option<&str>) -> WebResult<usize> {
    let mut v = Validator::new();
    let limit = v.integer("limit", raw, DEFAULT_SYNC_LIMIT, 1, MAX_LIMIT);
    v.finish()?;
    // u32 always fits in usize on supported targets
    Ok(usize::try_from(limit).unwrap_or(usize::MAX))
}

// ============================================================================
// Read Handlers
// ============================================================================

/// List events with pagination and filters.
///
/// # Example
///
/// ```bash
/// curl "http://localhost:3000/api/events?page=2&limit=10&search=summit&upcoming=true"
/// ```
///
/// # Errors
///
/// 400 listing every invalid parameter; 500 on database failure.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> WebResult<ApiResponse<Vec<Event>>> {
    let mut v = Validator::new();
    let page = v.integer("page", query.page.as_deref(), 1, 1, u32::MAX);
    let limit = v.integer("limit", query.limit.as_deref(), 10, 1, MAX_LIMIT);
    let search = v.text("search", query.search.as_deref(), 1, 100);
    let organizer = v.address("organizer", query.organizer.as_deref());
    let is_active = v.boolean("is_active", query.is_active.as_deref());
    let upcoming = v.boolean("upcoming", query.upcoming.as_deref());
    v.finish()?;

    let filter = EventFilter {
        search,
        organizer,
        is_active,
        upcoming_after: upcoming
            .unwrap_or(false)
            .then(|| chrono::Utc::now().timestamp_millis()),
    };

    let result = state
        .service
        .list_events(&filter, PageRequest { page, limit })
        .await?;
    Ok(paginated(result))
}

/// Active events that have not started yet, soonest first.
///
/// # Example
///
/// ```bash
/// curl "http://localhost:3000/api/events/upcoming?limit=5"
/// ```
///
/// # Errors
///
/// 400 for an invalid limit; 500 on database failure.
pub async fn upcoming_events(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> WebResult<ApiResponse<Vec<Event>>> {
    let mut v = Validator::new();
    let limit = v.integer("limit", query.limit.as_deref(), 10, 1, MAX_LIMIT);
    v.finish()?;

    let events = state.service.upcoming_events(limit).await?;
    let count = events.len();
    Ok(ApiResponse::ok(events).with_count(count))
}

/// Search events by name or venue.
///
/// # Example
///
/// ```bash
/// curl "http://localhost:3000/api/events/search?q=lisbon"
/// # {"success":true,"query":"lisbon","data":[...],"pagination":{...}}
/// ```
///
/// # Errors
///
/// 400 when `q` is missing or blank, or paging is invalid.
pub async fn search_events(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> WebResult<ApiResponse<Vec<Event>>> {
    let term = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::bad_request("Search query (q) is required"))?
        .to_string();

    let mut v = Validator::new();
    let page = v.integer("page", query.page.as_deref(), 1, 1, u32::MAX);
    let limit = v.integer("limit", query.limit.as_deref(), 10, 1, MAX_LIMIT);
    v.finish()?;

    let result = state
        .service
        .search_events(&term, PageRequest { page, limit })
        .await?;
    Ok(paginated(result).with_query(term))
}

/// Events created by one organizer, newest first.
///
/// # Errors
///
/// 400 for a malformed address; 500 on database failure.
pub async fn events_by_organizer(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> WebResult<ApiResponse<Vec<Event>>> {
    validate_address("address", &address)?;

    let events = state.service.events_by_organizer(&address).await?;
    let count = events.len();
    Ok(ApiResponse::ok(events).with_count(count))
}

/// Get event details.
///
/// Served from the cache; an event that is not cached yet is synced from
/// chain first.
///
/// # Example
///
/// ```bash
/// curl http://localhost:3000/api/events/0x5a1e...
/// ```
///
/// # Errors
///
/// 400 for a malformed ID, 404 when the object does not exist on chain.
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<ApiResponse<Event>> {
    validate_object_id("id", &id)?;

    let event = state.service.get_or_sync_event(&id).await?;
    Ok(ApiResponse::ok(event))
}

/// Seat and sales summary of a cached event.
///
/// # Errors
///
/// 400 for a malformed ID, 404 when the event is not cached.
pub async fn event_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<ApiResponse<EventStats>> {
    validate_object_id("id", &id)?;

    let stats = state.service.event_stats(&id).await?;
    Ok(ApiResponse::ok(stats))
}

// ============================================================================
// Write Handlers
// ============================================================================

/// Upload an event image to Walrus.
///
/// Expects a multipart form with the file in the `image` field.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:3000/api/events/upload-image \
///   -F "image=@poster.png;type=image/png"
/// # {"success":true,"data":{"blobId":"...","imageUrl":"https://aggregator.../v1/..."}}
/// ```
///
/// # Errors
///
/// 400 when no file is sent or the type is not allowed, 413 when the file
/// is too large, 500 when Walrus fails.
pub async fn upload_image(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    UserAgent(agent): UserAgent,
    multipart: Result<Multipart, MultipartRejection>,
) -> WebResult<ApiResponse<UploadedImage>> {
    let mut multipart = multipart.map_err(|_| AppError::bad_request("No file uploaded"))?;
    let max_bytes = state.walrus.max_image_bytes();

    let mut image: Option<Bytes> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("image") {
            continue;
        }

        let allowed = field.content_type().is_some_and(is_allowed_mime_type);
        if !allowed {
            return Err(AppError::bad_request(
                "Invalid file type. Only JPG, PNG, GIF, WebP allowed.",
            ));
        }

        image = Some(field.bytes().await.map_err(multipart_error)?);
        break;
    }

    let image = image
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| AppError::bad_request("No file uploaded"))?;

    if image.len() > max_bytes {
        return Err(AppError::payload_too_large(format!(
            "File too large. Maximum size is {}MB",
            max_bytes / (1024 * 1024)
        )));
    }

    tracing::info!(size = image.len(), %ip, user_agent = %agent, "Uploading image to Walrus");
    let blob_id = state
        .walrus
        .upload_image(image.to_vec())
        .await
        .map_err(ServiceError::from)?;

    let image_url = state.walrus.blob_url(&blob_id);
    Ok(ApiResponse::ok(UploadedImage { blob_id, image_url }))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large("File too large")
    } else {
        AppError::bad_request(err.body_text())
    }
}

/// Re-sync one event from chain.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:3000/api/events/0x5a1e.../sync
/// ```
///
/// # Errors
///
/// 400 for a malformed ID, 404 when the object does not exist on chain.
pub async fn sync_event(
    State(state): State<AppState>,
    CorrelationId(correlation_id): CorrelationId,
    ClientIp(ip): ClientIp,
    Path(id): Path<String>,
) -> WebResult<ApiResponse<Event>> {
    validate_object_id("id", &id)?;

    tracing::info!(event_id = %id, %correlation_id, %ip, "Manually syncing event from chain");
    let event = state.service.sync_event_from_chain(&id).await?;
    Ok(ApiResponse::ok(event).with_message("Event synced successfully"))
}

/// Sync the most recently created events.
///
/// Items that fail are listed under `failures`; the rest are still synced.
///
/// # Example
///
/// ```bash
/// curl -X POST "http://localhost:3000/api/events/sync-recent?limit=20"
/// # {"success":true,"message":"Synced 20 events","data":[...]}
/// ```
///
/// # Errors
///
/// 400 for an invalid limit; 500 when the chain query itself fails.
pub async fn sync_recent_events(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Query(query): Query<LimitQuery>,
) -> WebResult<ApiResponse<Vec<Event>>> {
    let limit = sync_limit(query.limit.as_deref())?;

    tracing::info!(limit, %ip, "Syncing recent events");
    let report = state.service.sync_recent_events(limit).await?;
    let message = format!("Synced {} events", report.synced.len());
    Ok(ApiResponse::ok(report.synced)
        .with_message(message)
        .with_failures(&report.failures))
}

/// Ingest recent seat reservations.
///
/// # Errors
///
/// 400 for an invalid limit; 500 when the chain query itself fails.
pub async fn sync_recent_reservations(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Query(query): Query<LimitQuery>,
) -> WebResult<ApiResponse<Vec<SeatReservation>>> {
    let limit = sync_limit(query.limit.as_deref())?;

    tracing::info!(limit, %ip, "Syncing recent reservations");
    let report = state.service.sync_recent_reservations(limit).await?;
    let message = format!("Recorded {} reservations", report.synced.len());
    Ok(ApiResponse::ok(report.synced)
        .with_message(message)
        .with_failures(&report.failures))
}
