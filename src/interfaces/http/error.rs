//! HTTP error envelope.
//!
//! Failures render as `{"status": "fail" | "error", "message": ...}`:
//! `fail` for caller faults, `error` for server faults. Storage details are
//! logged server-side and never returned.
use crate::error::CabError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
}

/// Structured error returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn fail(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                status: "fail",
                message: message.into(),
            },
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                status: "error",
                message: message.into(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<CabError> for ApiError {
    fn from(err: CabError) -> Self {
        match err {
            CabError::Validation(message) => ApiError::fail(StatusCode::BAD_REQUEST, message),
            CabError::NotFound(message) => ApiError::fail(StatusCode::NOT_FOUND, message),
            CabError::AlreadyExists(message) => ApiError::fail(StatusCode::CONFLICT, message),
            other => {
                tracing::error!(error = %other, "storage failure");
                ApiError::internal("internal storage error")
            }
        }
    }
}
