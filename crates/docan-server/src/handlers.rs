//! Request handlers.

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use docan_core::{
    report_file_name, DocanError, DocumentKind, HeaderData, LineItem, SpreadsheetExporter,
};

use crate::error::ApiError;
use crate::AppState;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "docan-server",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Extraction result of an uploaded document.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub header_data: HeaderData,
    pub line_items: Vec<LineItem>,
    pub raw_text: String,
}

/// Extract invoice data from the multipart field `file`.
pub async fn process_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Upload error: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|s| s.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Read error: {}", e)))?;

        upload = Some((file_name, content_type, data));
        break;
    }

    let (file_name, content_type, data) =
        upload.ok_or_else(|| ApiError::bad_request("No file provided"))?;

    let kind = DocumentKind::detect(content_type.as_deref(), file_name.as_deref()).ok_or_else(
        || {
            DocanError::UnsupportedDocument(
                content_type
                    .clone()
                    .or_else(|| file_name.clone())
                    .unwrap_or_else(|| "unknown".to_string()),
            )
        },
    )?;

    info!(
        "Processing upload {} ({:?}, {} bytes)",
        file_name.as_deref().unwrap_or("unnamed"),
        kind,
        data.len()
    );

    let reader = state.reader.clone();
    let parser = state.parser.clone();
    let (document, result) = tokio::task::spawn_blocking(move || {
        reader.read(&data, kind).map(|document| {
            let result = parser.parse(&document.text);
            (document, result)
        })
    })
    .await
    .map_err(|e| ApiError::internal(format!("Extraction task failed: {}", e)))??;

    Ok(Json(ProcessResponse {
        header_data: result.header.to_display(),
        line_items: result.line_items,
        raw_text: document.text,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    pub context: String,
    #[serde(default)]
    pub api_key: String,
}

/// Reply to a question. Failures are delivered as ordinary messages.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub failed: bool,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let api_key = if request.api_key.trim().is_empty() {
        state.config.chat.resolve_api_key().unwrap_or_default()
    } else {
        request.api_key
    };

    let reply = state
        .assistant
        .ask(&request.question, &request.context, &api_key)
        .await;
    debug!("Chat reply (failed={})", reply.is_failure());

    Json(ChatResponse {
        failed: reply.is_failure(),
        response: reply.into_text(),
    })
}

#[derive(Debug, Deserialize)]
pub struct ExcelRequest {
    pub header_data: HeaderData,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub corrected: bool,
}

/// Render the given (possibly corrected) data as an `.xlsx` download.
pub async fn download_excel(Json(request): Json<ExcelRequest>) -> Result<Response, ApiError> {
    let data = SpreadsheetExporter::new()
        .with_bold_headers(true)
        .to_bytes(&request.header_data, &request.line_items)
        .map_err(|e| ApiError::from(DocanError::from(e)))?;

    let file_name = report_file_name(&request.header_data, request.corrected);
    let disposition = format!("attachment; filename=\"{}\"", file_name);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}
