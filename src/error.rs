//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::FieldError;
use crate::repository::RepositoryError;
use crate::schema::MapperError;
use crate::store::StoreError;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Venue not found: {0}")]
    VenueNotFound(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] crate::domain::DomainError),

    // Server errors (5xx)
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut errors = Vec::new();
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::Validation(field_errors) => {
                errors = field_errors.clone();
                (StatusCode::BAD_REQUEST, "validation_failed", None)
            }

            // 404 Not Found
            AppError::VenueNotFound(id) => {
                (StatusCode::NOT_FOUND, "venue_not_found", Some(id.clone()))
            }

            // 500 Internal Server Error
            AppError::Domain(domain_err) => {
                tracing::error!("Domain precondition violated: {}", domain_err);
                (StatusCode::INTERNAL_SERVER_ERROR, "domain_error", None)
            }

            // 500 / 503
            AppError::Repository(RepositoryError::Store(e)) if e.is_connectivity() => {
                tracing::error!("Store unavailable: {:?}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", None)
            }
            AppError::Repository(RepositoryError::Store(StoreError::DuplicateKey(id))) => {
                (StatusCode::CONFLICT, "duplicate_id", Some(id.clone()))
            }
            AppError::Repository(RepositoryError::Mapper(MapperError::MissingId)) => {
                (StatusCode::BAD_REQUEST, "missing_id", None)
            }
            AppError::Repository(e) => {
                tracing::error!("Repository error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "store_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
            errors,
        };

        (status, Json(body)).into_response()
    }
}
