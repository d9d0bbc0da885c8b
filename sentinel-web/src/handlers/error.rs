//! Mapping of application errors onto HTTP responses

use super::types::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use sentinel_applications::ApplicationError;
use tracing::error;

/// Error returned by API handlers
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: message.into(),
                field: None,
            },
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        let status = match &err {
            ApplicationError::Validation { field, message } => {
                return Self {
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    body: ErrorResponse {
                        error: message.clone(),
                        field: Some(field.clone()),
                    },
                };
            }
            ApplicationError::UnknownQuery { .. } => StatusCode::NOT_FOUND,
            ApplicationError::InsufficientFindings { .. } => StatusCode::CONFLICT,
            ApplicationError::Superseded { .. } => StatusCode::CONFLICT,
            // Display carries only the fixed user-facing message
            ApplicationError::Gateway(_) => StatusCode::BAD_GATEWAY,
            ApplicationError::Core(_) | ApplicationError::Internal { .. } => {
                error!(error = %err, "Request failed");
                return Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
            }
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
