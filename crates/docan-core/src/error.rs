//! Error types for the docan-core library.
//!
//! The extraction core itself never fails; these errors belong to the
//! collaborators around it (PDF, OCR, export, chat, editing).

use thiserror::Error;

/// Main error type for the docan library.
#[derive(Error, Debug)]
pub enum DocanError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Spreadsheet export error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// Chat backend error.
    #[error("chat error: {0}")]
    Chat(#[from] ChatError),

    /// Editing session error.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document format is not supported.
    #[error("unsupported document type: {0}")]
    UnsupportedDocument(String),

    /// No text could be obtained from the document.
    #[error("no text could be extracted from the document")]
    NoText,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// OCR is disabled or no engine is available.
    #[error("no OCR engine available")]
    Unavailable,
}

/// Errors related to spreadsheet export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The workbook writer failed.
    #[error("failed to write workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    /// Writing the workbook file failed.
    #[error("failed to save workbook: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by a chat backend.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Transport-level failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The API answered without any content.
    #[error("response contained no answer")]
    EmptyResponse,
}

/// Errors raised while editing extracted data.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// The value cannot be read as a monetary amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// There is no line item at the given position.
    #[error("no line item at position {0}")]
    NoSuchItem(usize),
}

/// Result type for the docan library.
pub type Result<T> = std::result::Result<T, DocanError>;
