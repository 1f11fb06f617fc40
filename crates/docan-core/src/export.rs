//! Spreadsheet export of extraction results.

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;

use crate::error::ExportError;
use crate::models::invoice::{HeaderData, LineItem, NOT_FOUND};

/// Name of the sheet holding the header fields.
pub const SUMMARY_SHEET: &str = "Summary";

/// Name of the sheet holding the line items.
pub const LINE_ITEMS_SHEET: &str = "Line Items";

const ITEM_COLUMNS: [&str; 2] = ["description", "amount"];

/// Writes extraction results as `.xlsx` workbooks.
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetExporter {
    bold_headers: bool,
}

impl SpreadsheetExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render column headers in bold.
    pub fn with_bold_headers(mut self, bold: bool) -> Self {
        self.bold_headers = bold;
        self
    }

    /// Build the workbook in memory.
    ///
    /// The line items sheet is only written when there is at least one item.
    pub fn to_bytes(
        &self,
        header: &HeaderData,
        line_items: &[LineItem],
    ) -> Result<Vec<u8>, ExportError> {
        let mut workbook = Workbook::new();
        let header_format = if self.bold_headers {
            Format::new().set_bold()
        } else {
            Format::new()
        };

        let summary = workbook.add_worksheet();
        summary.set_name(SUMMARY_SHEET)?;
        for (col, (label, value)) in HeaderData::labels()
            .iter()
            .zip(header.values())
            .enumerate()
        {
            summary.write_string_with_format(0, col as u16, *label, &header_format)?;
            summary.write_string(1, col as u16, value)?;
        }

        if !line_items.is_empty() {
            let sheet = workbook.add_worksheet();
            sheet.set_name(LINE_ITEMS_SHEET)?;
            for (col, label) in ITEM_COLUMNS.iter().enumerate() {
                sheet.write_string_with_format(0, col as u16, *label, &header_format)?;
            }
            for (i, item) in line_items.iter().enumerate() {
                let row = i as u32 + 1;
                sheet.write_string(row, 0, &item.description)?;
                sheet.write_number(row, 1, item.amount.to_f64().unwrap_or_default())?;
            }
        }

        let data = workbook.save_to_buffer()?;
        debug!(
            "Exported workbook with {} line items ({} bytes)",
            line_items.len(),
            data.len()
        );
        Ok(data)
    }

    /// Write the workbook to a file.
    pub fn save(
        &self,
        path: &std::path::Path,
        header: &HeaderData,
        line_items: &[LineItem],
    ) -> Result<(), ExportError> {
        let data = self.to_bytes(header, line_items)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

/// File name for a downloaded report.
///
/// `invoice_<number>.xlsx`, or `invoice_report.xlsx` when the number is
/// unknown. Characters outside `[A-Za-z0-9_-]` are replaced by `_`.
pub fn report_file_name(header: &HeaderData, corrected: bool) -> String {
    let number = header.invoice_number.trim();
    let stem = if number.is_empty() || number == NOT_FOUND {
        "report".to_string()
    } else {
        number
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    };

    let suffix = if corrected { "_corrected" } else { "" };
    format!("invoice_{}{}.xlsx", stem, suffix)
}
