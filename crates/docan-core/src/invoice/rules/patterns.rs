//! Common regex patterns for invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Tabular line item: sequence number, description, amount.
    // Applied to one physical line at a time. The amount is digits and commas
    // with at most 26 digits before the point, so every match fits a Decimal.
    pub static ref LINE_ITEM: Regex = Regex::new(
        r"^\d+\s+(.*?)\s+((?:,+(?:[0-9],*){0,26}|(?:[0-9],*){1,26})\.[0-9]{2})$"
    ).unwrap();

    // Invoice number patterns
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)INVOICE\s+([A-Z0-9]+)"
    ).unwrap();

    // Date patterns ("March 4, 2024")
    pub static ref DATE_LONG: Regex = Regex::new(
        r"(?i)Date\s+([A-Za-z]+\s+\d{1,2},\s+\d{4})"
    ).unwrap();
}
