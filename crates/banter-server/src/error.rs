//! HTTP boundary error type.
//!
//! Everything the handlers can fail with is translated here into a status
//! code and a client-safe message; storage and gateway detail stays in the
//! logs.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use banter_llm::LlmError;
use banter_storage::StoreError;
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{} not found", resource))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.status.as_u16(),
                "message": self.message,
            }
        }));
        (self.status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateIdentity => {
                Self::new(StatusCode::CONFLICT, "Username or email already registered")
            }
            StoreError::NotFound(resource) => Self::not_found(resource),
            StoreError::AccessDenied => Self::forbidden("Access denied"),
            other => {
                tracing::error!(error = %other, "storage failure");
                Self::internal("Internal error")
            }
        }
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        tracing::warn!(
            error = %err,
            unavailable = err.is_unavailable(),
            "completion gateway failure"
        );
        Self::new(
            StatusCode::BAD_GATEWAY,
            "The assistant is unavailable right now. Please try again.",
        )
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(error = %err, "API error");
        Self::internal("Internal error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        assert_eq!(
            ApiError::from(StoreError::DuplicateIdentity).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StoreError::NotFound("conversation")).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StoreError::AccessDenied).status,
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_llm_errors_stay_generic() {
        let err = ApiError::from(LlmError::Rejected {
            status: 429,
            message: "quota details from provider".to_string(),
        });
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert!(!err.message.contains("quota"));
    }
}
