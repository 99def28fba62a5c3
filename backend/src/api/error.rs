//! Mapping of service failures to HTTP errors.
//!
//! This is the only place that decides status codes for failures raised
//! below the handlers.

use crate::services::ServiceError;
use suistage_walrus::WalrusError;
use suistage_web::AppError;

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let app_error = match &err {
            ServiceError::Validation(message) => Self::bad_request(message.clone()),
            ServiceError::Unauthorized(message) => Self::unauthorized(message.clone()),
            ServiceError::NotFound(message) => Self::not_found(message.clone()),
            ServiceError::Chain(e) if e.is_not_found() => Self::not_found("Event not found"),
            ServiceError::Store(e) if e.is_unique_violation() => {
                Self::conflict("Resource already exists")
            }
            ServiceError::Store(e) if e.is_foreign_key_violation() => {
                Self::bad_request("Referenced resource does not exist")
            }
            ServiceError::Blob(WalrusError::InvalidImage(e)) => Self::bad_request(e.to_string()),
            _ => Self::internal("Internal server error"),
        };

        app_error.with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use suistage_store::StoreError;
    use suistage_sui::SuiError;
    use suistage_walrus::ImageError;

    fn status_of(err: ServiceError) -> StatusCode {
        AppError::from(err).status()
    }

    #[test]
    fn test_named_errors() {
        assert_eq!(status_of(ServiceError::Validation("bad".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ServiceError::Unauthorized("no".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(ServiceError::NotFound("gone".into())), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_constraints() {
        let unique = AppError::from(ServiceError::Store(StoreError::UniqueViolation("dup".into())));
        assert_eq!(unique.status(), StatusCode::CONFLICT);
        assert_eq!(unique.message(), "Resource already exists");

        let fk = AppError::from(ServiceError::Store(StoreError::ForeignKeyViolation("fk".into())));
        assert_eq!(fk.status(), StatusCode::BAD_REQUEST);
        assert_eq!(fk.message(), "Referenced resource does not exist");
    }

    #[test]
    fn test_missing_chain_object_is_not_found() {
        let err = ServiceError::Chain(SuiError::ObjectNotFound {
            object_id: "0x1".into(),
            reason: "notExists".into(),
        });
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_rejected_image_is_bad_request() {
        let err = ServiceError::Blob(WalrusError::InvalidImage(ImageError::UnsupportedFormat));
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_everything_else_is_internal() {
        let err = AppError::from(ServiceError::Store(StoreError::Database("disk I/O error".into())));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Internal server error");

        let err = ServiceError::Chain(SuiError::RequestFailed("connection refused".into()));
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
