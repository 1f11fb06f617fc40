//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;
#[cfg(test)]
pub(crate) use extractor::sample_pdf;

use crate::error::PdfError;
use image::DynamicImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract embedded text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Extract embedded images from a page (1-indexed).
    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>>;
}
