//! HTTP API for invoice document analysis.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use docan_core::models::config::DocanConfig;
use docan_core::{ChatBackend, DocumentAssistant, DocumentReader, InvoiceParser, OpenRouterClient};

pub use error::ApiError;

/// Shared state of all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DocanConfig>,
    pub reader: Arc<DocumentReader>,
    pub parser: Arc<InvoiceParser>,
    pub assistant: Arc<DocumentAssistant<Arc<dyn ChatBackend>>>,
}

impl AppState {
    pub fn new(
        config: DocanConfig,
        reader: DocumentReader,
        parser: InvoiceParser,
        backend: Arc<dyn ChatBackend>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            reader: Arc::new(reader),
            parser: Arc::new(parser),
            assistant: Arc::new(DocumentAssistant::new(backend)),
        }
    }

    /// Build the state with the OCR engine and OpenRouter client from configuration.
    pub fn from_config(config: DocanConfig) -> anyhow::Result<Self> {
        let reader = DocumentReader::from_config(&config);
        let parser = InvoiceParser::from_config(&config.extraction)?;
        let backend: Arc<dyn ChatBackend> = Arc::new(OpenRouterClient::new(&config.chat)?);
        Ok(Self::new(config, reader, parser, backend))
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let max_upload = state.config.server.max_upload_bytes;

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/process-document/", post(handlers::process_document))
        .route("/chat/", post(handlers::chat))
        .route("/download-excel/", post(handlers::download_excel))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
