//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::kiosk::KioskError;
use crate::shop::ShopError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// The session's role does not allow the action
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Order status change outside the pipeline
    #[error("{0}")]
    InvalidTransition(String),

    /// Request conflicts with the current session state
    #[error("{0}")]
    Conflict(String),

    /// Key-value store error
    #[error("Storage error: {0}")]
    Storage(#[from] crate::store::StorageError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<KioskError> for ApiError {
    fn from(err: KioskError) -> Self {
        match err {
            KioskError::Shop(shop) => match shop {
                ShopError::Validation(msg) => ApiError::Validation(msg),
                ShopError::MenuItemNotFound(_)
                | ShopError::CartItemNotFound(_)
                | ShopError::OrderNotFound(_) => ApiError::NotFound(shop.to_string()),
                ShopError::InvalidTransition { .. } => {
                    ApiError::InvalidTransition(shop.to_string())
                }
                ShopError::EmptyCart => ApiError::Conflict(shop.to_string()),
            },
            KioskError::Storage(e) => ApiError::Storage(e),
            KioskError::Forbidden { .. } | KioskError::InvalidPassword => {
                ApiError::Forbidden(err.to_string())
            }
            KioskError::ViewNotAllowed { .. } => ApiError::Validation(err.to_string()),
            KioskError::PaymentInProgress | KioskError::PaymentNotOpen => {
                ApiError::Conflict(err.to_string())
            }
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::InvalidTransition(_) => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            ApiError::Internal(_) | ApiError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
