//! Amount parsing, formatting and total reconciliation.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use tracing::warn;

use crate::models::invoice::{Field, LineItem};

/// Parse an amount written with optional comma grouping (e.g. "1,234.56").
///
/// Surrounding whitespace is ignored. A missing integer part (".50") reads as zero.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.starts_with('.') {
        format!("0{}", cleaned)
    } else {
        cleaned
    };

    Decimal::from_str(&normalized).ok()
}

/// Format an amount with exactly two fractional digits.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Sum all line item amounts (zero for no items).
///
/// Returns `None` when the sum does not fit in a `Decimal`.
pub fn sum_amounts(items: &[LineItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.amount))
}

/// Turn a summed total into the header value.
///
/// Only a strictly positive sum counts as found; zero cannot be told apart
/// from "no line items".
pub fn reconciled_total(sum: Decimal) -> Field<Decimal> {
    if sum > Decimal::ZERO {
        Field::Present(sum.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    } else {
        Field::Absent
    }
}

/// Sum the items and reconcile in one step.
///
/// An overflowing sum is reported as not found.
pub fn reconcile(items: &[LineItem]) -> Field<Decimal> {
    match sum_amounts(items) {
        Some(sum) => reconciled_total(sum),
        None => {
            warn!("Line item total of {} items overflows, leaving total unset", items.len());
            Field::Absent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_amount("99.00"), Some(Decimal::new(9900, 2)));
        assert_eq!(parse_amount(" 1,000,000.01 "), Some(Decimal::new(100000001, 2)));
        assert_eq!(parse_amount(",.50"), Some(Decimal::new(50, 2)));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(123456, 2)), "1234.56");
        assert_eq!(format_amount(Decimal::new(5, 0)), "5.00");
        assert_eq!(format_amount(Decimal::new(10005, 3)), "10.01");
    }

    #[test]
    fn test_sum_amounts() {
        let items = vec![
            LineItem::new("A", Decimal::new(1050, 2)),
            LineItem::new("B", Decimal::new(2000, 2)),
        ];
        assert_eq!(sum_amounts(&items), Some(Decimal::new(3050, 2)));
        assert_eq!(sum_amounts(&[]), Some(Decimal::ZERO));
    }

    #[test]
    fn test_reconciled_total() {
        assert_eq!(reconcile(&[]), Field::Absent);
        assert_eq!(reconciled_total(Decimal::ZERO), Field::Absent);
        assert_eq!(
            reconciled_total(Decimal::new(1, 2)),
            Field::Present(Decimal::new(1, 2))
        );
    }

    #[test]
    fn test_overflowing_total_is_absent() {
        let items = vec![
            LineItem::new("Big order", Decimal::MAX),
            LineItem::new("Another big order", Decimal::MAX),
        ];
        assert_eq!(sum_amounts(&items), None);
        assert_eq!(reconcile(&items), Field::Absent);
    }

    #[test]
    fn test_zero_amount_items_render_absent() {
        let items = vec![LineItem::new("Free sample", Decimal::new(0, 2))];
        assert_eq!(reconcile(&items), Field::Absent);
    }
}
