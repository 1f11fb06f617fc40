//! Rendering extraction results for files and terminals.

use serde::Serialize;

use docan_core::models::invoice::{ExtractionResult, HeaderData, LineItem};
use docan_core::invoice::rules::format_amount;
use docan_core::SpreadsheetExporter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per line item
    Csv,
    /// Plain text summary
    Text,
    /// Excel workbook
    Xlsx,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
            OutputFormat::Xlsx => "xlsx",
        }
    }

    /// Whether the rendering is binary and cannot go to a terminal.
    pub fn is_binary(&self) -> bool {
        matches!(self, OutputFormat::Xlsx)
    }
}

/// Same shape as the HTTP API's document response.
#[derive(Serialize)]
struct Report<'a> {
    header_data: HeaderData,
    line_items: &'a [LineItem],
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_text: Option<&'a str>,
}

pub fn render(
    result: &ExtractionResult,
    raw_text: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<Vec<u8>> {
    let data = match format {
        OutputFormat::Json => {
            let report = Report {
                header_data: result.header.to_display(),
                line_items: &result.line_items,
                raw_text,
            };
            serde_json::to_vec_pretty(&report)?
        }
        OutputFormat::Csv => format_csv(result)?.into_bytes(),
        OutputFormat::Text => format_text(result, raw_text).into_bytes(),
        OutputFormat::Xlsx => {
            SpreadsheetExporter::new()
                .with_bold_headers(true)
                .to_bytes(&result.header.to_display(), &result.line_items)?
        }
    };
    Ok(data)
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let header = result.header.to_display();
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "invoice_number",
        "date",
        "total_amount",
        "description",
        "amount",
    ])?;

    if result.line_items.is_empty() {
        wtr.write_record([
            header.invoice_number.as_str(),
            header.date.as_str(),
            header.total_amount.as_str(),
            "",
            "",
        ])?;
    }

    for item in &result.line_items {
        wtr.write_record([
            header.invoice_number.as_str(),
            header.date.as_str(),
            header.total_amount.as_str(),
            item.description.as_str(),
            format_amount(item.amount).as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub fn format_text(result: &ExtractionResult, raw_text: Option<&str>) -> String {
    let header = result.header.to_display();
    let mut output = String::new();

    for (label, value) in HeaderData::labels().iter().zip(header.values()) {
        output.push_str(&format!("{}: {}\n", label, value));
    }
    output.push('\n');

    if result.line_items.is_empty() {
        output.push_str("No line items found.\n");
    } else {
        output.push_str("Line items:\n");
        let width = result
            .line_items
            .iter()
            .map(|item| item.description.chars().count())
            .max()
            .unwrap_or(0);
        for (i, item) in result.line_items.iter().enumerate() {
            output.push_str(&format!(
                "  {:>3}. {:<width$}  {:>12}\n",
                i + 1,
                item.description,
                format_amount(item.amount),
                width = width
            ));
        }
    }

    if let Some(text) = raw_text {
        output.push_str("\nExtracted text:\n");
        output.push_str(text);
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use docan_core::InvoiceParser;
    use pretty_assertions::assert_eq;

    const TEXT: &str = "INVOICE AB1234\n1 Widget 1,000.00\n2 Service fee 300.00";

    #[test]
    fn test_csv_rows_per_item() {
        let result = InvoiceParser::new().parse(TEXT);
        let csv = String::from_utf8(render(&result, None, OutputFormat::Csv).unwrap()).unwrap();

        assert_eq!(
            csv,
            "invoice_number,date,total_amount,description,amount\n\
             AB1234,Not Found,1300.00,Widget,1000.00\n\
             AB1234,Not Found,1300.00,Service fee,300.00\n"
        );
    }

    #[test]
    fn test_text_summary() {
        let result = InvoiceParser::new().parse(TEXT);
        let text = format_text(&result, None);

        assert!(text.starts_with("Invoice Number: AB1234\nDate: Not Found\nTotal Amount: 1300.00\n"));
        assert!(text.contains("1. Widget"));
        assert!(!text.contains("Extracted text"));
    }

    #[test]
    fn test_json_includes_raw_text_on_request() {
        let result = InvoiceParser::new().parse(TEXT);
        let json: serde_json::Value =
            serde_json::from_slice(&render(&result, Some(TEXT), OutputFormat::Json).unwrap())
                .unwrap();

        assert_eq!(json["header_data"]["Total Amount"], "1300.00");
        assert_eq!(json["line_items"][1]["amount"], 300.0);
        assert_eq!(json["raw_text"], TEXT);
    }
}
