//! Editable state for reviewing one document.
//!
//! The original extraction result is kept untouched; all edits apply to a
//! corrected copy that can be reset at any time.

use rust_decimal::Decimal;
use tracing::debug;

use crate::chat::{ChatMessage, ChatReply};
use crate::error::SessionError;
use crate::invoice::rules::amounts::{parse_amount, reconcile};
use crate::invoice::rules::normalize::collapse_whitespace;
use crate::models::invoice::{ExtractionResult, Field, InvoiceHeader, LineItem, NOT_FOUND};

/// A loaded document with its corrections and chat history.
#[derive(Debug, Clone)]
pub struct Session {
    document_name: String,
    raw_text: String,
    original: ExtractionResult,
    header: InvoiceHeader,
    line_items: Vec<LineItem>,
    history: Vec<ChatMessage>,
}

impl Session {
    pub fn new(
        document_name: impl Into<String>,
        raw_text: impl Into<String>,
        result: ExtractionResult,
    ) -> Self {
        Self {
            document_name: document_name.into(),
            raw_text: raw_text.into(),
            header: result.header.clone(),
            line_items: result.line_items.clone(),
            original: result,
            history: Vec::new(),
        }
    }

    /// Replace the document. Corrections and chat history are discarded.
    pub fn load(
        &mut self,
        document_name: impl Into<String>,
        raw_text: impl Into<String>,
        result: ExtractionResult,
    ) {
        *self = Self::new(document_name, raw_text, result);
        debug!("Loaded document {}", self.document_name);
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Extraction result as first produced.
    pub fn original(&self) -> &ExtractionResult {
        &self.original
    }

    pub fn header(&self) -> &InvoiceHeader {
        &self.header
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Current corrected result.
    pub fn corrected(&self) -> ExtractionResult {
        ExtractionResult {
            header: self.header.clone(),
            line_items: self.line_items.clone(),
        }
    }

    /// Whether anything differs from the original extraction.
    pub fn is_modified(&self) -> bool {
        self.header != self.original.header || self.line_items != self.original.line_items
    }

    pub fn set_invoice_number(&mut self, value: &str) {
        self.header.invoice_number = text_field(value);
    }

    pub fn set_date(&mut self, value: &str) {
        self.header.date = text_field(value);
    }

    /// Override the total. Blank or `Not Found` clears it.
    pub fn set_total(&mut self, value: &str) -> Result<(), SessionError> {
        let value = value.trim();
        self.header.total_amount = if value.is_empty() || value == NOT_FOUND {
            Field::Absent
        } else {
            Field::Present(amount(value)?)
        };
        Ok(())
    }

    pub fn set_item_description(&mut self, index: usize, value: &str) -> Result<(), SessionError> {
        self.item_mut(index)?.description = collapse_whitespace(value);
        Ok(())
    }

    pub fn set_item_amount(&mut self, index: usize, value: &str) -> Result<(), SessionError> {
        let parsed = amount(value)?;
        self.item_mut(index)?.amount = parsed;
        Ok(())
    }

    /// Append an item, returning its index.
    pub fn add_item(&mut self, description: &str, value: &str) -> Result<usize, SessionError> {
        let parsed = amount(value)?;
        self.line_items
            .push(LineItem::new(collapse_whitespace(description), parsed));
        Ok(self.line_items.len() - 1)
    }

    pub fn remove_item(&mut self, index: usize) -> Result<LineItem, SessionError> {
        if index >= self.line_items.len() {
            return Err(SessionError::NoSuchItem(index));
        }
        Ok(self.line_items.remove(index))
    }

    /// Set the total to the sum of the current items.
    pub fn recompute_total(&mut self) -> &Field<Decimal> {
        self.header.total_amount = reconcile(&self.line_items);
        &self.header.total_amount
    }

    /// Drop all corrections.
    pub fn reset(&mut self) {
        self.header = self.original.header.clone();
        self.line_items = self.original.line_items.clone();
    }

    /// Append a question and its reply to the history.
    pub fn record_exchange(&mut self, question: &str, reply: &ChatReply) {
        self.history.push(ChatMessage::user(question));
        self.history.push(ChatMessage::assistant(reply.text()));
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Description and amount of each item, for charting.
    pub fn cost_breakdown(&self) -> Vec<(String, Decimal)> {
        self.line_items
            .iter()
            .map(|item| (item.description.clone(), item.amount))
            .collect()
    }

    fn item_mut(&mut self, index: usize) -> Result<&mut LineItem, SessionError> {
        self.line_items
            .get_mut(index)
            .ok_or(SessionError::NoSuchItem(index))
    }
}

fn text_field(value: &str) -> Field<String> {
    let value = value.trim();
    if value.is_empty() || value == NOT_FOUND {
        Field::Absent
    } else {
        Field::Present(value.to_string())
    }
}

/// Amounts entered during editing must be non-negative.
fn amount(value: &str) -> Result<Decimal, SessionError> {
    parse_amount(value)
        .filter(|amount| !amount.is_sign_negative())
        .ok_or_else(|| SessionError::InvalidAmount(value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatRole;
    use crate::invoice::InvoiceParser;
    use pretty_assertions::assert_eq;

    const TEXT: &str = "INVOICE AB1234\nDate March 4, 2024\n1 Widget 1,000.00\n2 Service fee 300.00";

    fn session() -> Session {
        Session::new("scan.pdf", TEXT, InvoiceParser::new().parse(TEXT))
    }

    #[test]
    fn test_edits_leave_original_untouched() {
        let mut session = session();
        session.set_invoice_number(" XY9 ");
        session.set_date("Not Found");
        session.set_item_amount(0, "900.00").unwrap();

        assert_eq!(session.header().invoice_number, Field::Present("XY9".to_string()));
        assert_eq!(session.header().date, Field::Absent);
        assert_eq!(
            session.original().header.invoice_number,
            Field::Present("AB1234".to_string())
        );
        assert_eq!(session.original().line_items[0].amount, Decimal::new(100000, 2));
        assert!(session.is_modified());

        session.reset();
        assert!(!session.is_modified());
        assert_eq!(session.corrected(), *session.original());
    }

    #[test]
    fn test_total_is_not_recomputed_implicitly() {
        let mut session = session();
        session.remove_item(1).unwrap();

        assert_eq!(session.header().display_total(), "1300.00");
        assert_eq!(*session.recompute_total(), Field::Present(Decimal::new(100000, 2)));
    }

    #[test]
    fn test_recompute_without_items_is_absent() {
        let mut session = session();
        session.remove_item(1).unwrap();
        session.remove_item(0).unwrap();

        assert_eq!(*session.recompute_total(), Field::Absent);
    }

    #[test]
    fn test_set_total() {
        let mut session = session();
        session.set_total("1,250.5").unwrap();
        assert_eq!(session.header().display_total(), "1250.50");

        assert_eq!(
            session.set_total("lots"),
            Err(SessionError::InvalidAmount("lots".to_string()))
        );
        session.set_total("").unwrap();
        assert_eq!(session.header().total_amount, Field::Absent);
    }

    #[test]
    fn test_negative_amounts_are_rejected() {
        let mut session = session();

        assert_eq!(
            session.set_item_amount(0, "-5"),
            Err(SessionError::InvalidAmount("-5".to_string()))
        );
        assert_eq!(
            session.add_item("Refund", " -12.50 "),
            Err(SessionError::InvalidAmount("-12.50".to_string()))
        );
        assert_eq!(
            session.set_total("-1"),
            Err(SessionError::InvalidAmount("-1".to_string()))
        );
        assert_eq!(session.line_items().len(), 2);
        assert!(!session.is_modified());
    }

    #[test]
    fn test_item_edits() {
        let mut session = session();
        let index = session.add_item("  Extra   part ", "12.50").unwrap();
        assert_eq!(index, 2);
        assert_eq!(session.line_items()[2].description, "Extra part");

        session.set_item_description(2, "Spare\tpart").unwrap();
        assert_eq!(session.line_items()[2].description, "Spare part");

        assert_eq!(session.remove_item(7), Err(SessionError::NoSuchItem(7)));
        assert_eq!(
            session.set_item_amount(7, "1.00"),
            Err(SessionError::NoSuchItem(7))
        );
        assert_eq!(
            session.add_item("Bad", "x"),
            Err(SessionError::InvalidAmount("x".to_string()))
        );
    }

    #[test]
    fn test_cost_breakdown() {
        assert_eq!(
            session().cost_breakdown(),
            vec![
                ("Widget".to_string(), Decimal::new(100000, 2)),
                ("Service fee".to_string(), Decimal::new(30000, 2)),
            ]
        );
    }

    #[test]
    fn test_history_cleared_on_load() {
        let mut session = session();
        session.record_exchange("Total?", &ChatReply::Answer("1300.00".to_string()));

        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[0].role, ChatRole::User);
        assert_eq!(session.history()[1].content, "1300.00");

        session.load("other.png", "", ExtractionResult::default());
        assert!(session.history().is_empty());
        assert_eq!(session.document_name(), "other.png");
    }
}
