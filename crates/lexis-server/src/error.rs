//! Error handling for the REST API server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use lexis_core::error::LexisError;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    // Common error constructors
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

// Convert from lexis-core errors, keeping the core error code.
impl From<LexisError> for ApiError {
    fn from(err: LexisError) -> Self {
        let code = err.code().as_str();
        let suggestion = err.suggestion().map(str::to_string);
        let message = err.to_string();

        let api = match err {
            LexisError::NotFound { .. } => ApiError::not_found(message),
            LexisError::InvalidInput { .. } => ApiError::validation(message),
            LexisError::Configuration(_) => ApiError::bad_request(message),
            LexisError::Database { .. } => {
                tracing::error!(code, error = %message, "Storage failure");
                ApiError::internal(message)
            }
            LexisError::Parse { .. }
            | LexisError::Schedule { .. }
            | LexisError::Io(_)
            | LexisError::Serialization(_)
            | LexisError::Internal(_) => {
                tracing::error!(code, error = %message, "Internal failure");
                ApiError::internal(message)
            }
        };

        let api = ApiError { code: code.to_string(), ..api };
        match suggestion {
            Some(s) => api.with_details(serde_json::json!({ "suggestion": s })),
            None => api,
        }
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(LexisError::sense_not_found(3)).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(LexisError::invalid_judgment("meh")).status,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(LexisError::Configuration("bad".into())).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(LexisError::database("locked")).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_core_code_is_kept() {
        let err = ApiError::from(LexisError::invalid_judgment("meh"));
        assert_eq!(err.code, "VAL_002");
        assert!(err.details.is_some());
    }
}
