//! Rule-based field extractors for invoice text.

pub mod amounts;
pub mod header;
pub mod line_items;
pub mod normalize;
pub mod patterns;

pub use amounts::{format_amount, parse_amount, reconcile, reconciled_total, sum_amounts};
pub use header::{FieldRule, FieldRules, HeaderExtractor};
pub use line_items::{extract_line_items, LineItemExtractor};
pub use normalize::collapse_whitespace;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field, in order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// An extracted value with the text it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte span in the searched text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
