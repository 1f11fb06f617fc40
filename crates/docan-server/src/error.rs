//! Mapping of library errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use docan_core::error::OcrError;
use docan_core::DocanError;

/// An error reported to API clients as `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<DocanError> for ApiError {
    fn from(err: DocanError) -> Self {
        let status = match &err {
            DocanError::UnsupportedDocument(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            DocanError::NoText | DocanError::Pdf(_) | DocanError::Image(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            DocanError::Ocr(OcrError::Unavailable) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed: {}", self.detail);
        }
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
