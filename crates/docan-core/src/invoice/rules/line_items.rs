//! Line item extraction from tabular invoice text.

use tracing::trace;

use super::amounts::parse_amount;
use super::normalize::collapse_whitespace;
use super::patterns::LINE_ITEM;
use super::{ExtractionMatch, FieldExtractor};
use crate::models::invoice::LineItem;

/// Line item extractor.
///
/// A physical line qualifies when it is a sequence number, a description and
/// an amount with exactly two decimals, and nothing after the amount.
/// Anything else is skipped.
pub struct LineItemExtractor;

impl LineItemExtractor {
    pub fn new() -> Self {
        Self
    }

    fn parse_line(&self, line: &str) -> Option<LineItem> {
        let caps = LINE_ITEM.captures(line)?;

        let description = collapse_whitespace(&caps[1]);
        if description.is_empty() {
            trace!("Skipping line item without description: {:?}", line);
            return None;
        }

        let amount = parse_amount(&caps[2])?;
        Some(LineItem::new(description, amount))
    }
}

impl Default for LineItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for LineItemExtractor {
    type Output = ExtractionMatch<LineItem>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();
        let mut offset = 0;

        for raw_line in text.split('\n') {
            let start = offset;
            offset += raw_line.len() + 1;

            let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
            if let Some(item) = self.parse_line(line) {
                results.push(
                    ExtractionMatch::new(item, line).with_position(start, start + line.len()),
                );
            }
        }

        results
    }
}

/// Extract line items from document text, in document order.
pub fn extract_line_items(text: &str) -> Vec<LineItem> {
    LineItemExtractor::new()
        .extract_all(text)
        .into_iter()
        .map(|m| m.value)
        .collect()
}
