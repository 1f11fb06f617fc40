//! Core library for invoice document analysis.
//!
//! This crate provides:
//! - Document text sources (embedded PDF text, OCR for scans and images)
//! - Rule-based invoice field extraction (number, date, line items, total)
//! - Spreadsheet export of results
//! - Questions about a document answered by a chat model
//! - Editable review sessions

pub mod chat;
pub mod document;
pub mod error;
pub mod export;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod session;

pub use chat::{ChatBackend, ChatMessage, ChatReply, ChatRole, DocumentAssistant, OpenRouterClient};
pub use document::{DocumentKind, DocumentReader, DocumentText};
pub use error::{DocanError, Result};
pub use export::{report_file_name, SpreadsheetExporter};
pub use invoice::{InvoiceExtractor, InvoiceParser};
pub use models::config::DocanConfig;
pub use models::invoice::{
    ExtractionResult, Field, HeaderData, InvoiceHeader, LineItem, SourceType, NOT_FOUND,
};
pub use ocr::{TextBox, TextRecognizer};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pdf::{PdfExtractor, PdfProcessor};
pub use session::Session;
