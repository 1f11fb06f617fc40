//! Assembles header fields and line items into one extraction result.

use std::time::Instant;

use tracing::{debug, info};

use super::rules::{amounts::reconcile, line_items::extract_line_items, HeaderExtractor};
use super::InvoiceExtractor;
use crate::error::DocanError;
use crate::models::config::ExtractionConfig;
use crate::models::invoice::ExtractionResult;

/// Rule-based invoice parser.
///
/// Line items are extracted and summed first so the header can embed the
/// reconciled total. The parser holds no mutable state and can be shared
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct InvoiceParser {
    header: HeaderExtractor,
}

impl InvoiceParser {
    /// Create a parser with the built-in rules.
    pub fn new() -> Self {
        Self {
            header: HeaderExtractor::new(),
        }
    }

    /// Create a parser with the configured extra header patterns.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, DocanError> {
        Ok(Self {
            header: HeaderExtractor::from_config(config)?,
        })
    }

    /// Use a custom header extractor.
    pub fn with_header_extractor(mut self, header: HeaderExtractor) -> Self {
        self.header = header;
        self
    }

    /// Parse extracted document text.
    pub fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();

        let line_items = extract_line_items(text);
        let total = reconcile(&line_items);
        let header = self.header.extract(text, total);

        info!(
            "Parsed {} characters: {} line items, invoice number {}",
            text.len(),
            line_items.len(),
            header.invoice_number.display()
        );
        debug!(
            "Header date {}, total {} in {:?}",
            header.date.display(),
            header.display_total(),
            start.elapsed()
        );

        ExtractionResult { header, line_items }
    }
}

impl InvoiceExtractor for InvoiceParser {
    fn extract_from_text(&self, text: &str) -> ExtractionResult {
        self.parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::amounts::{format_amount, sum_amounts};
    use crate::models::invoice::{Field, LineItem, NOT_FOUND};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    const SAMPLE: &str = "ACME Supplies Ltd.\n\
                          INVOICE INV2024001\n\
                          Date March 4, 2024\n\
                          \n\
                          1 Widget Assembly 1,234.56\n\
                          2 Bolts   (box of 100)\t 45.00\n\
                          3 Shipping 20.44\n\
                          \n\
                          Total Due 1,300.00\n";

    #[test]
    fn test_parse_sample_invoice() {
        let result = InvoiceParser::new().parse(SAMPLE);

        assert_eq!(
            result.header.invoice_number,
            Field::Present("INV2024001".to_string())
        );
        assert_eq!(result.header.date, Field::Present("March 4, 2024".to_string()));
        assert_eq!(
            result.line_items,
            vec![
                LineItem::new("Widget Assembly", Decimal::new(123456, 2)),
                LineItem::new("Bolts (box of 100)", Decimal::new(4500, 2)),
                LineItem::new("Shipping", Decimal::new(2044, 2)),
            ]
        );
        assert_eq!(result.header.display_total(), "1300.00");
    }

    #[test]
    fn test_no_line_items_means_total_not_found() {
        let result = InvoiceParser::new().parse("INVOICE AB1234\nDate March 4, 2024");

        assert!(result.line_items.is_empty());
        assert_eq!(result.header.total_amount, Field::Absent);
        assert_eq!(result.header.display_total(), NOT_FOUND);
    }

    #[test]
    fn test_total_matches_sum_of_items() {
        let result = InvoiceParser::new().parse(SAMPLE);
        let sum = sum_amounts(&result.line_items).unwrap();

        assert_eq!(result.header.display_total(), format_amount(sum));
    }

    #[test]
    fn test_huge_totals_do_not_panic() {
        let text: String = (1..=1000)
            .map(|n| format!("{} Bulk order 99,999,999,999,999,999,999,999,999.00\n", n))
            .collect();
        let result = InvoiceParser::new().parse(&text);

        assert_eq!(result.line_items.len(), 1000);
        assert_eq!(result.header.total_amount, Field::Absent);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let parser = InvoiceParser::new();
        assert_eq!(parser.parse(SAMPLE), parser.parse(SAMPLE));
    }

    #[test]
    fn test_missing_header_does_not_affect_items() {
        let result = InvoiceParser::new().parse("1 Bolt 10.00\n2 Nut 2.50");

        assert_eq!(result.header.invoice_number, Field::Absent);
        assert_eq!(result.header.date, Field::Absent);
        assert_eq!(result.line_items.len(), 2);
        assert_eq!(result.header.display_total(), "12.50");
    }

    #[test]
    fn test_extractor_trait() {
        let parser = InvoiceParser::new();
        let extractor: &dyn InvoiceExtractor = &parser;

        assert_eq!(extractor.extract_from_text(SAMPLE), parser.parse(SAMPLE));
    }
}
