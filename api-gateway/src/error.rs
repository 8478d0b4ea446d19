//! Error handling for the API gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error information
    pub error: ErrorInfo,
    /// Request ID for tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Detailed error information
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error code (string identifier for the error type)
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API errors
#[derive(Debug, thiserror::Error)]
#[allow(dead_code)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Common error: {0}")]
    Common(#[from] common::error::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Generate a request ID for tracking errors
        let request_id = Uuid::new_v4().to_string();

        // Log the error with request ID for backend tracing
        tracing::error!("API Error [{}]: {:?}", request_id, &self);

        use common::error::Error;

        let (status, code, details) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", None),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None),
            ApiError::Common(e) => {
                let status = match e {
                    // Client errors (4xx)
                    Error::InvalidTransaction(_)
                    | Error::UnsupportedTransactionKind(_)
                    | Error::InvalidAmount(_)
                    | Error::InsufficientBalance(_)
                    | Error::ValidationError(_) => StatusCode::BAD_REQUEST,
                    Error::AccountNotFound(_)
                    | Error::ClientNotFound(_)
                    | Error::TransactionNotFound(_) => StatusCode::NOT_FOUND,
                    // Retryable: the guards could not be acquired in time
                    Error::Contention(_) => StatusCode::CONFLICT,

                    // Server errors (5xx)
                    Error::ConfigurationError(_)
                    | Error::Internal(_)
                    | Error::Serialization(_)
                    | Error::DecimalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };

                let details = match e {
                    Error::Database(db) => Some(serde_json::json!({
                        "db_error": db.to_string(),
                    })),
                    _ => None,
                };

                (status, e.code(), details)
            }
        };

        // Create the error response
        let error_response = ErrorResponse {
            error: ErrorInfo {
                code: code.to_string(),
                message: self.to_string(),
                details,
            },
            request_id: Some(request_id),
        };

        // Return the response with appropriate status code
        (status, Json(error_response)).into_response()
    }
}
