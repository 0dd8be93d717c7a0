//! HTTP mapping for the service's error taxonomy.
//!
//! Keeps the domain error types HTTP-agnostic while letting handlers use
//! `?` and still produce consistent JSON error bodies and status codes.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

use crate::api::ApiError;
use crate::registry::UserError;
use crate::storage::StorageError;

fn json_error(status: StatusCode, error: &impl std::fmt::Display) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "error": error.to_string() }))
}

/// Upstream failures are the weather provider's fault, not the caller's.
impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_GATEWAY
    }

    fn error_response(&self) -> HttpResponse {
        json_error(self.status_code(), self)
    }
}

impl ResponseError for UserError {
    fn status_code(&self) -> StatusCode {
        match self {
            UserError::DuplicateUsername(_) => StatusCode::BAD_REQUEST,
            UserError::UserNotFound(_) | UserError::CityNotFound { .. } => StatusCode::NOT_FOUND,
            UserError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        json_error(self.status_code(), self)
    }
}

impl ResponseError for StorageError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        json_error(self.status_code(), self)
    }
}
