//! Invoice data models produced by extraction and edited by users.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::invoice::rules::amounts::format_amount;

/// Display text for a field that could not be determined.
pub const NOT_FOUND: &str = "Not Found";

/// Column label of the invoice number in tabular output.
pub const INVOICE_NUMBER_LABEL: &str = "Invoice Number";

/// Column label of the invoice date in tabular output.
pub const DATE_LABEL: &str = "Date";

/// Column label of the reconciled total in tabular output.
pub const TOTAL_AMOUNT_LABEL: &str = "Total Amount";

/// A header value that is either known or explicitly absent.
///
/// Serializes as an optional value (`null` when absent). The [`NOT_FOUND`]
/// text only appears through [`Field::display`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
    /// The value was determined.
    Present(T),
    /// The value could not be determined.
    #[default]
    Absent,
}

impl<T> Field<T> {
    /// Check whether a value is present.
    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    /// Borrow the value, if any.
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Field::Present(value) => Some(value),
            Field::Absent => None,
        }
    }

    /// Convert into an `Option`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Present(value) => Some(value),
            Field::Absent => None,
        }
    }

    /// Map the contained value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Field::Present(value) => Field::Present(f(value)),
            Field::Absent => Field::Absent,
        }
    }
}

impl<T: fmt::Display> Field<T> {
    /// Render for presentation, using [`NOT_FOUND`] when absent.
    pub fn display(&self) -> String {
        match self {
            Field::Present(value) => value.to_string(),
            Field::Absent => NOT_FOUND.to_string(),
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Field::Present(value),
            None => Field::Absent,
        }
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Field::from)
    }
}

/// A single purchased good or service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Whitespace-normalized description.
    pub description: String,

    /// Monetary amount for this line.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl LineItem {
    pub fn new(description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

/// Document-level fields of an invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceHeader {
    /// Invoice identifier.
    pub invoice_number: Field<String>,

    /// Invoice date, verbatim as printed.
    pub date: Field<String>,

    /// Sum of the line item amounts.
    pub total_amount: Field<Decimal>,
}

impl InvoiceHeader {
    /// Total rendered with two fractional digits, or [`NOT_FOUND`].
    pub fn display_total(&self) -> String {
        match &self.total_amount {
            Field::Present(total) => format_amount(*total),
            Field::Absent => NOT_FOUND.to_string(),
        }
    }

    /// Presentation view of the header.
    pub fn to_display(&self) -> HeaderData {
        HeaderData {
            invoice_number: self.invoice_number.display(),
            date: self.date.display(),
            total_amount: self.display_total(),
        }
    }
}

/// Header and line items extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Header fields.
    pub header: InvoiceHeader,

    /// Line items in document order.
    pub line_items: Vec<LineItem>,
}

/// Header rendered for people and spreadsheets.
///
/// Field names match the column labels shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderData {
    #[serde(rename = "Invoice Number", default = "not_found")]
    pub invoice_number: String,

    #[serde(rename = "Date", default = "not_found")]
    pub date: String,

    #[serde(rename = "Total Amount", default = "not_found")]
    pub total_amount: String,
}

fn not_found() -> String {
    NOT_FOUND.to_string()
}

impl HeaderData {
    /// Column labels in display order.
    pub fn labels() -> [&'static str; 3] {
        [INVOICE_NUMBER_LABEL, DATE_LABEL, TOTAL_AMOUNT_LABEL]
    }

    /// Values in the same order as [`HeaderData::labels`].
    pub fn values(&self) -> [&str; 3] {
        [&self.invoice_number, &self.date, &self.total_amount]
    }
}

impl From<&InvoiceHeader> for HeaderData {
    fn from(header: &InvoiceHeader) -> Self {
        header.to_display()
    }
}

/// Where the document text came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Text-based PDF (native text extraction).
    TextPdf,
    /// Image-based PDF (OCR on page images).
    ImagePdf,
    /// Direct image file.
    Image,
    /// Plain text supplied by the caller.
    PlainText,
    /// Unknown source.
    #[default]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_display() {
        let present: Field<String> = Field::Present("AB1234".to_string());
        let absent: Field<String> = Field::Absent;

        assert_eq!(present.display(), "AB1234");
        assert_eq!(absent.display(), NOT_FOUND);
    }

    #[test]
    fn test_field_serializes_as_option() {
        let header = InvoiceHeader {
            invoice_number: Field::Present("AB1234".to_string()),
            date: Field::Absent,
            total_amount: Field::Absent,
        };

        let json = serde_json::to_value(&header).unwrap();
        assert_eq!(json["invoice_number"], "AB1234");
        assert!(json["date"].is_null());

        let back: InvoiceHeader = serde_json::from_value(json).unwrap();
        assert_eq!(back, header);
    }

    #[test]
    fn test_header_display_total() {
        let header = InvoiceHeader {
            total_amount: Field::Present(Decimal::new(12345, 1)),
            ..Default::default()
        };
        assert_eq!(header.display_total(), "1234.50");
        assert_eq!(InvoiceHeader::default().display_total(), NOT_FOUND);
    }

    #[test]
    fn test_header_data_uses_column_labels() {
        let data = InvoiceHeader::default().to_display();
        let json = serde_json::to_value(&data).unwrap();

        assert_eq!(json["Invoice Number"], NOT_FOUND);
        assert_eq!(json["Date"], NOT_FOUND);
        assert_eq!(json["Total Amount"], NOT_FOUND);
    }

    #[test]
    fn test_line_item_amount_is_a_json_number() {
        let item = LineItem::new("Widget", Decimal::new(1050, 2));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["amount"], serde_json::json!(10.5));
    }
}
