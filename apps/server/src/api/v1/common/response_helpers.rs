use axum::Json;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use protocol::ErrorBody;
use tracing::error;

use crate::api::v1::services::ServiceError;
use crate::api::v1::views;

/// Helper function to create an error body
pub fn error(message: impl Into<String>) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: message.into(),
    })
}

/// Helper function to create a bad request response
pub fn bad_request(message: impl std::fmt::Display) -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::BAD_REQUEST, error(message.to_string()))
}

/// Helper function to create a not found error response
pub fn not_found(message: impl std::fmt::Display) -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::NOT_FOUND, error(message.to_string()))
}

/// Helper function to create an internal server error response
pub fn internal_error(e: impl std::fmt::Display) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        error(format!("Internal server error: {}", e)),
    )
}

/// HTTP status matching a service failure
pub fn status_for(e: &ServiceError) -> StatusCode {
    match e {
        ServiceError::Validation(_) | ServiceError::Format(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Import(_) | ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// JSON response for a service failure
pub fn service_error(e: ServiceError) -> Response {
    let status = status_for(&e);
    match e {
        ServiceError::Internal(e) => {
            error!("Internal error: {:#}", e);
            internal_error(e).into_response()
        }
        other => {
            if status.is_server_error() {
                error!("Request failed: {}", other);
            }
            (status, error(other.to_string())).into_response()
        }
    }
}

/// HTML response for a service failure on the web surface
pub fn page_error(e: ServiceError) -> Response {
    let status = status_for(&e);
    let message = match &e {
        ServiceError::Internal(inner) => {
            error!("Internal error: {:#}", inner);
            "Something went wrong. Please try again.".to_string()
        }
        other => other.to_string(),
    };
    (status, Html(views::message_page(status, &message))).into_response()
}
