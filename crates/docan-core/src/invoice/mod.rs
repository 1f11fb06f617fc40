//! Invoice field extraction module.

mod parser;
pub mod rules;

pub use parser::InvoiceParser;

use crate::models::invoice::ExtractionResult;

/// Trait for invoice extractors.
///
/// Extraction works on already-materialized text and never fails: anything
/// that cannot be recognized is reported as absent data.
pub trait InvoiceExtractor: Send + Sync {
    /// Extract invoice data from plain text.
    fn extract_from_text(&self, text: &str) -> ExtractionResult;
}
