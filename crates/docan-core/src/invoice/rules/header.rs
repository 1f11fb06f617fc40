//! Header field extraction through ordered pattern tables.

use regex::{Regex, RegexBuilder};
use rust_decimal::Decimal;

use super::patterns::{DATE_LONG, INVOICE_NUMBER};
use super::{ExtractionMatch, FieldExtractor};
use crate::error::DocanError;
use crate::models::config::ExtractionConfig;
use crate::models::invoice::{Field, InvoiceHeader};

/// A pattern plus the capture group holding the value.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pattern: Regex,
    group: usize,
}

impl FieldRule {
    pub fn new(pattern: Regex, group: usize) -> Self {
        Self { pattern, group }
    }

    /// Compile a case-insensitive rule taking its value from `group`.
    pub fn parse(pattern: &str, group: usize) -> Result<Self, DocanError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| DocanError::Config(format!("invalid pattern {:?}: {}", pattern, e)))?;

        if regex.captures_len() <= group {
            return Err(DocanError::Config(format!(
                "pattern {:?} has no capture group {}",
                pattern, group
            )));
        }

        Ok(Self::new(regex, group))
    }

    fn find(&self, text: &str) -> Option<ExtractionMatch<String>> {
        let caps = self.pattern.captures(text)?;
        let value = caps.get(self.group)?;
        let full = caps.get(0)?;

        Some(
            ExtractionMatch::new(value.as_str().trim().to_string(), full.as_str())
                .with_position(full.start(), full.end()),
        )
    }
}

/// Ordered alternatives for one field. The first rule that matches wins.
#[derive(Debug, Clone, Default)]
pub struct FieldRules {
    rules: Vec<FieldRule>,
}

impl FieldRules {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    /// Append a rule, tried after the existing ones.
    pub fn push(&mut self, rule: FieldRule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First matching value as a header field.
    pub fn first_match(&self, text: &str) -> Field<String> {
        self.extract(text).map(|m| m.value).into()
    }
}

impl FieldExtractor for FieldRules {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.rules.iter().find_map(|rule| rule.find(text))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.rules.iter().filter_map(|rule| rule.find(text)).collect()
    }
}

/// Extracts the invoice number and date from the full document text.
#[derive(Debug, Clone)]
pub struct HeaderExtractor {
    invoice_number: FieldRules,
    date: FieldRules,
}

impl HeaderExtractor {
    /// Create an extractor with the built-in rules.
    pub fn new() -> Self {
        Self {
            invoice_number: FieldRules::new(vec![FieldRule::new(INVOICE_NUMBER.clone(), 1)]),
            date: FieldRules::new(vec![FieldRule::new(DATE_LONG.clone(), 1)]),
        }
    }

    /// Built-in rules followed by the configured extra patterns.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, DocanError> {
        let mut extractor = Self::new();

        for pattern in &config.invoice_number_patterns {
            extractor.invoice_number.push(FieldRule::parse(pattern, 1)?);
        }
        for pattern in &config.date_patterns {
            extractor.date.push(FieldRule::parse(pattern, 1)?);
        }

        Ok(extractor)
    }

    /// Add an invoice number alternative.
    pub fn with_invoice_number_rule(mut self, rule: FieldRule) -> Self {
        self.invoice_number.push(rule);
        self
    }

    /// Add a date alternative.
    pub fn with_date_rule(mut self, rule: FieldRule) -> Self {
        self.date.push(rule);
        self
    }

    /// Build the header, embedding the caller's reconciled total.
    pub fn extract(&self, text: &str, total_amount: Field<Decimal>) -> InvoiceHeader {
        InvoiceHeader {
            invoice_number: self.invoice_number.first_match(text),
            date: self.date.first_match(text),
            total_amount,
        }
    }
}

impl Default for HeaderExtractor {
    fn default() -> Self {
        Self::new()
    }
}
