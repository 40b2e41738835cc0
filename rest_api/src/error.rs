// rest_api/src/error.rs

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use rx_lib::RxError;
use rx_models::ApiResponse;

pub const UNEXPECTED_SERVER_ERROR: &str = "Unexpected server error";

// Define the REST API error enum
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad input format, SSN conflicts, schema violations and unreadable bodies.
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    /// Carries the cause for the log; clients only see the generic message.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RxError> for ApiError {
    fn from(err: RxError) -> Self {
        match err {
            RxError::Validation(errors) => ApiError::BadRequest(errors.to_string()),
            RxError::InvalidInput(message) | RxError::AlreadyExists(message) => {
                ApiError::BadRequest(message)
            }
            RxError::NotFound(message) => ApiError::NotFound(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

// Implement IntoResponse for ApiError to convert it into an HTTP response
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(message) | ApiError::NotFound(message) => message,
            ApiError::Internal(cause) => {
                error!("Request failed: {}", cause);
                UNEXPECTED_SERVER_ERROR.to_string()
            }
        };

        (status, Json(ApiResponse::<()>::failure(message))).into_response()
    }
}
