//! Success envelope.
//!
//! Every successful response has the same outer shape:
//!
//! ```json
//! {
//!   "success": true,
//!   "data": [ ... ],
//!   "pagination": { "page": 1, "limit": 10, "total": 42, "totalPages": 5 }
//! }
//! ```
//!
//! `message`, `count`, `query`, `pagination` and `failures` appear only when
//! set.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

/// Page metadata for list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page, starting at 1
    pub page: u32,
    /// Rows per page
    pub limit: u32,
    /// Rows across all pages
    pub total: i64,
    /// `ceil(total / limit)`
    pub total_pages: i64,
}

/// Successful response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<String>,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failures: Option<Value>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap `data` in a success envelope.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            query: None,
            data,
            count: None,
            pagination: None,
            failures: None,
        }
    }

    /// Human-readable summary.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Echo the search term back to the client.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Number of items in `data`.
    #[must_use]
    pub const fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Page metadata.
    #[must_use]
    pub const fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Per-item failures of a batch operation. Omitted when empty.
    #[must_use]
    pub fn with_failures<F: Serialize>(mut self, failures: &[F]) -> Self {
        if !failures.is_empty() {
            self.failures = serde_json::to_value(failures).ok();
        }
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_envelope() {
        let body = serde_json::to_value(ApiResponse::ok(json!({ "id": 1 }))).unwrap();
        assert_eq!(body, json!({ "success": true, "data": { "id": 1 } }));
    }

    #[test]
    fn test_pagination_is_camel_case() {
        let response = ApiResponse::ok(Vec::<u8>::new())
            .with_query("jazz")
            .with_pagination(Pagination {
                page: 2,
                limit: 10,
                total: 15,
                total_pages: 2,
            });
        let body = serde_json::to_value(response).unwrap();

        assert_eq!(body["query"], "jazz");
        assert_eq!(body["pagination"]["totalPages"], 2);
        assert!(body.get("count").is_none());
    }

    #[test]
    fn test_empty_failures_omitted() {
        let body = serde_json::to_value(
            ApiResponse::ok(1)
                .with_message("Synced 1 events")
                .with_count(1)
                .with_failures::<String>(&[]),
        )
        .unwrap();

        assert_eq!(body["message"], "Synced 1 events");
        assert_eq!(body["count"], 1);
        assert!(body.get("failures").is_none());
    }
}
