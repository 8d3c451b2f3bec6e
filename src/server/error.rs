//! HTTP error responses.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::error::{ExtractError, OcrError};

/// Errors surfaced by the route handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Malformed multipart body, or one over the size limit.
    #[error("Failed to read upload: {}", .0.body_text())]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<usize>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Multipart(e) => e.status(),
            ApiError::Extract(e) => match e {
                ExtractError::NotAPdf { .. }
                | ExtractError::DocumentOpen { .. }
                | ExtractError::PasswordRequired { .. }
                | ExtractError::WrongPassword { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                ExtractError::Ocr {
                    source: OcrError::NotInstalled { .. },
                    ..
                }
                | ExtractError::PdfiumBindingFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
                ExtractError::FileNotFound { .. } => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Multipart(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                "payload_too_large"
            }
            ApiError::Multipart(_) => "bad_request",
            ApiError::Extract(e) => e.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Extraction failed: {}", self);
        } else {
            tracing::warn!("Rejected upload: {}", self);
        }

        let page = match &self {
            ApiError::Extract(e) => e.page(),
            _ => None,
        };
        let body = Json(ErrorResponse {
            error: self.code(),
            message: self.to_string(),
            page,
        });

        (status, body).into_response()
    }
}
