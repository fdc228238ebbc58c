//! Error handling for the shelf HTTP layer.
//!
//! Every handler fault is one of these variants; conversion to a response
//! produces the uniform `{success: false, message}` envelope with the
//! mapped status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use shelf_store::StoreError;

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("duplicate: {message}")]
    Duplicate { message: String },

    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a duplicate-record error
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate {
            message: message.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Stable identifier for logs
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::Duplicate { .. } => "duplicate",
            AppError::Unauthorized { .. } => "unauthorized",
            AppError::BadRequest { .. } => "bad_request",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Duplicate { .. } => StatusCode::BAD_REQUEST,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { .. } => AppError::Duplicate {
                message: err.to_string(),
            },
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let kind = self.kind();
        let status = self.status_code();

        let message = match self {
            AppError::Validation { message }
            | AppError::NotFound { message }
            | AppError::Duplicate { message }
            | AppError::Unauthorized { message }
            | AppError::BadRequest { message } => message,
            AppError::Internal(err) => err.to_string(),
        };

        tracing::error!(
            error_id = %error_id,
            error_kind = kind,
            status_code = %status.as_u16(),
            "request error"
        );

        // In production, hide internal error details.
        let message = if cfg!(not(debug_assertions)) && status == StatusCode::INTERNAL_SERVER_ERROR
        {
            "an internal server error occurred".to_string()
        } else {
            message
        };

        let body = json!({
            "success": false,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            AppError::validation("title is required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::duplicate("already reviewed").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::bad_request("missing query").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::not_found("no such book").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::unauthorized("not yours").status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn unique_violation_becomes_duplicate() {
        let err = AppError::from(StoreError::UniqueViolation {
            collection: "reviews".to_string(),
            index: "book_id+user_id".to_string(),
        });
        assert!(matches!(err, AppError::Duplicate { .. }));
    }

    #[test]
    fn other_store_errors_become_internal() {
        let err = AppError::from(StoreError::UnknownCollection("x".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_uses_mapped_status() {
        let response = AppError::not_found("book not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_error_mapping() {
        let err = AppError::Internal(anyhow::anyhow!("store connection lost"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
