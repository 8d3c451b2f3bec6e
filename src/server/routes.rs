//! Route handlers.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use super::error::ApiError;
use super::AppState;

/// Field names accepted for the uploaded document.
const FILE_FIELDS: [&str; 2] = ["file", "document"];
const DEFAULT_FILENAME: &str = "upload.pdf";

#[derive(Serialize)]
pub(super) struct HealthResponse {
    status: &'static str,
    version: &'static str,
    ocr_engine: &'static str,
    ocr_available: bool,
}

pub(super) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        ocr_engine: state.extractor().ocr_engine().name(),
        ocr_available: state.ocr_available().await,
    })
}

/// Extract the text of an uploaded PDF and return it as `text/plain`.
pub(super) async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        let filename = field.file_name().map(|s| s.to_string());

        tracing::debug!("Received field: name='{}', filename={:?}", name, filename);

        // Plain form fields without a filename are skipped unless explicitly named.
        if !FILE_FIELDS.contains(&name.as_str()) && filename.is_none() {
            continue;
        }

        let filename = filename.unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        let data = field.bytes().await?;

        let output = state.extractor().extract(&data, &filename).await?;

        return Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            output.text,
        ));
    }

    tracing::warn!("No file field found in multipart upload");
    Err(ApiError::BadRequest(
        "No file provided. Use field name 'file' or 'document'".to_string(),
    ))
}
