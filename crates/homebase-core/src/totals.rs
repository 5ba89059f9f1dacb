//! # Totals Engine
//!
//! Computes the monetary totals of an invoice or estimate from its line
//! items and the document-level discount.
//!
//! ## Order of Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  per line      line_subtotal      = quantity × unit_price              │
//! │                discount_amount    = line_subtotal × discount% / 100    │
//! │                after_discount     = line_subtotal − discount_amount    │
//! │                                                                         │
//! │  document      subtotal_after_discount = Σ after_discount              │
//! │                document_discount  = subtotal_after_discount × doc%     │
//! │                after_doc_discount = subtotal_after_discount − doc disc │
//! │                                                                         │
//! │  per line      allocated = after_doc_discount × share of the line      │
//! │                vat       = allocated × vat% / 100                       │
//! │                                                                         │
//! │  document      total = after_doc_discount + Σ vat                      │
//! │                                                                         │
//! │  ROUND TO 0.01 ONLY HERE, ON EACH OUTPUT FIELD                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## VAT Allocation
//! The document discount is spread across lines in proportion to their
//! after-discount amounts before each line's own VAT rate is applied.
//! Invoices and estimates use the same method, so a document with mixed
//! VAT rates gets identical totals whichever kind it is.

use rust_decimal::Decimal;

use crate::money::{percent_of, round_minor};
use crate::types::{DocumentTotals, LineItem};

/// Unrounded per-line figures behind a [`DocumentTotals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineBreakdown {
    pub line_subtotal: Decimal,
    pub discount_amount: Decimal,
    pub line_subtotal_after_discount: Decimal,
    /// Share of the post-document-discount subtotal carried by this line.
    pub allocated_amount: Decimal,
    pub vat_amount: Decimal,
}

/// Rounded totals plus the per-line figures, in line order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TotalsBreakdown {
    pub lines: Vec<LineBreakdown>,
    pub totals: DocumentTotals,
}

/// Computes the document totals.
///
/// Inputs are trusted: negative amounts propagate and percentages are not
/// clamped. See [`crate::validation`] for the checks callers run first.
///
/// ## Example
/// ```rust
/// use homebase_core::{totals, LineItem};
/// use rust_decimal::Decimal;
///
/// let items = vec![
///     LineItem::new("Design", Decimal::ONE, Decimal::from(1000)).with_discount(Decimal::from(10)),
/// ];
/// let t = totals::compute(&items, Decimal::from(10));
///
/// assert_eq!(t.subtotal_after_document_discount, Decimal::from(810));
/// assert_eq!(t.total_vat, Decimal::new(20250, 2));
/// assert_eq!(t.total, Decimal::new(101250, 2));
/// ```
pub fn compute(line_items: &[LineItem], document_discount_percent: Decimal) -> DocumentTotals {
    breakdown(line_items, document_discount_percent).totals
}

/// Computes the totals and keeps the per-line figures.
pub fn breakdown(line_items: &[LineItem], document_discount_percent: Decimal) -> TotalsBreakdown {
    let mut lines = Vec::with_capacity(line_items.len());
    let mut subtotal = Decimal::ZERO;
    let mut total_discount = Decimal::ZERO;
    let mut subtotal_after_discount = Decimal::ZERO;

    for item in line_items {
        let line_subtotal = item.quantity * item.unit_price;
        let discount_amount = percent_of(line_subtotal, item.discount_percent);
        let line_subtotal_after_discount = line_subtotal - discount_amount;

        subtotal += line_subtotal;
        total_discount += discount_amount;
        subtotal_after_discount += line_subtotal_after_discount;

        lines.push(LineBreakdown {
            line_subtotal,
            discount_amount,
            line_subtotal_after_discount,
            ..LineBreakdown::default()
        });
    }

    let document_discount_amount = percent_of(subtotal_after_discount, document_discount_percent);
    let subtotal_after_document_discount = subtotal_after_discount - document_discount_amount;

    let mut total_vat = Decimal::ZERO;
    for (line, item) in lines.iter_mut().zip(line_items) {
        line.allocated_amount = allocate(
            subtotal_after_document_discount,
            line.line_subtotal_after_discount,
            subtotal_after_discount,
        );
        line.vat_amount = percent_of(line.allocated_amount, item.vat_rate_percent);
        total_vat += line.vat_amount;
    }

    let total = subtotal_after_document_discount + total_vat;

    TotalsBreakdown {
        lines,
        totals: DocumentTotals {
            subtotal: round_minor(subtotal),
            total_discount: round_minor(total_discount),
            subtotal_after_discount: round_minor(subtotal_after_discount),
            document_discount_amount: round_minor(document_discount_amount),
            subtotal_after_document_discount: round_minor(subtotal_after_document_discount),
            total_vat: round_minor(total_vat),
            total: round_minor(total),
        },
    }
}

/// Share of `amount` carried by a line worth `part` of `whole`.
///
/// Multiplies first to keep the result exact; products beyond the decimal
/// range fall back to dividing first, which stays in range because the
/// share of a non-negative line never exceeds one.
fn allocate(amount: Decimal, part: Decimal, whole: Decimal) -> Decimal {
    // All-zero documents have nothing to allocate.
    if whole.is_zero() {
        return Decimal::ZERO;
    }

    match amount.checked_mul(part) {
        Some(product) => product / whole,
        None => amount * (part / whole),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::within_minor_unit;
    use rust_decimal_macros::dec;

    fn item(qty: Decimal, price: Decimal, discount: Decimal, vat: Decimal) -> LineItem {
        LineItem::new("", qty, price)
            .with_discount(discount)
            .with_vat_rate(vat)
    }

    fn samples() -> Vec<(Vec<LineItem>, Decimal)> {
        vec![
            (vec![item(dec!(2), dec!(100), dec!(0), dec!(25))], dec!(0)),
            (vec![item(dec!(1), dec!(1000), dec!(10), dec!(25))], dec!(10)),
            (
                vec![
                    item(dec!(3), dec!(19.99), dec!(5), dec!(25)),
                    item(dec!(7), dec!(0.33), dec!(0), dec!(12)),
                    item(dec!(1.5), dec!(849.50), dec!(12.5), dec!(6)),
                ],
                dec!(7.5),
            ),
            (
                vec![
                    item(dec!(1), dec!(0.01), dec!(0), dec!(25)),
                    item(dec!(1), dec!(0.01), dec!(0), dec!(25)),
                    item(dec!(1), dec!(0.01), dec!(0), dec!(25)),
                ],
                dec!(33.333),
            ),
            (vec![item(dec!(13), dec!(7.77), dec!(100), dec!(25))], dec!(0)),
        ]
    }

    #[test]
    fn test_scenario_single_line_no_discount() {
        let t = compute(&[item(dec!(2), dec!(100), dec!(0), dec!(25))], dec!(0));
        assert_eq!(t.subtotal, dec!(200.00));
        assert_eq!(t.total_vat, dec!(50.00));
        assert_eq!(t.total, dec!(250.00));
    }

    #[test]
    fn test_scenario_line_and_document_discount() {
        let items = [item(dec!(1), dec!(1000), dec!(10), dec!(25))];
        let b = breakdown(&items, dec!(10));

        assert_eq!(b.lines[0].line_subtotal, dec!(1000));
        assert_eq!(b.lines[0].discount_amount, dec!(100));
        assert_eq!(b.totals.subtotal_after_discount, dec!(900));
        assert_eq!(b.totals.document_discount_amount, dec!(90));
        assert_eq!(b.totals.subtotal_after_document_discount, dec!(810));
        assert_eq!(b.totals.total_vat, dec!(202.50));
        assert_eq!(b.totals.total, dec!(1012.50));
    }

    #[test]
    fn test_empty_document_is_zero() {
        let t = compute(&[], dec!(15));
        assert_eq!(t, DocumentTotals::default());
        assert_eq!(t.total, Decimal::ZERO);
    }

    #[test]
    fn test_zero_value_lines_do_not_divide_by_zero() {
        let items = [
            item(dec!(0), dec!(100), dec!(0), dec!(25)),
            item(dec!(5), dec!(0), dec!(0), dec!(12)),
        ];
        let b = breakdown(&items, dec!(10));
        assert_eq!(b.totals, DocumentTotals::default());
        assert!(b.lines.iter().all(|l| l.allocated_amount.is_zero()));
    }

    #[test]
    fn test_document_discount_spread_across_vat_rates() {
        // 200 @ 25% and 100 with 50% line discount @ 12%, then 10% off
        let items = [
            item(dec!(2), dec!(100), dec!(0), dec!(25)),
            item(dec!(1), dec!(100), dec!(50), dec!(12)),
        ];
        let b = breakdown(&items, dec!(10));

        assert_eq!(b.totals.subtotal, dec!(300));
        assert_eq!(b.totals.total_discount, dec!(50));
        assert_eq!(b.totals.subtotal_after_discount, dec!(250));
        assert_eq!(b.totals.document_discount_amount, dec!(25));
        assert_eq!(b.lines[0].allocated_amount, dec!(180));
        assert_eq!(b.lines[1].allocated_amount, dec!(45));
        assert_eq!(b.lines[0].vat_amount, dec!(45));
        assert_eq!(b.lines[1].vat_amount, dec!(5.4));
        assert_eq!(b.totals.total_vat, dec!(50.40));
        assert_eq!(b.totals.total, dec!(275.40));
    }

    /// Per-line rounding would give 0.00 VAT here; rounding once gives 0.01.
    #[test]
    fn test_rounds_only_at_the_end() {
        let items = [
            item(dec!(1), dec!(0.01), dec!(0), dec!(25)),
            item(dec!(1), dec!(0.01), dec!(0), dec!(25)),
            item(dec!(1), dec!(0.01), dec!(0), dec!(25)),
        ];
        let t = compute(&items, dec!(0));
        assert_eq!(t.subtotal, dec!(0.03));
        assert_eq!(t.total_vat, dec!(0.01));
        assert_eq!(t.total, dec!(0.04));
    }

    #[test]
    fn test_negative_line_reduces_totals() {
        let items = [
            item(dec!(1), dec!(500), dec!(0), dec!(25)),
            item(dec!(-1), dec!(100), dec!(0), dec!(25)),
        ];
        let t = compute(&items, dec!(0));
        assert_eq!(t.subtotal, dec!(400));
        assert_eq!(t.total_vat, dec!(100));
        assert_eq!(t.total, dec!(500));
    }

    #[test]
    fn test_deterministic() {
        for (items, discount) in samples() {
            assert_eq!(compute(&items, discount), compute(&items, discount));
        }
    }

    #[test]
    fn test_total_conserves_parts() {
        for (items, discount) in samples() {
            let t = compute(&items, discount);
            assert!(within_minor_unit(
                t.total,
                t.subtotal_after_document_discount + t.total_vat
            ));
            assert!(t.total >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_total_increases_with_unit_price() {
        let base = vec![
            item(dec!(2), dec!(10), dec!(0), dec!(25)),
            item(dec!(1), dec!(99.99), dec!(20), dec!(12)),
        ];
        let before = compute(&base, dec!(0)).total;

        let mut raised = base.clone();
        raised[0].unit_price += dec!(0.01);
        let after = compute(&raised, dec!(0)).total;

        assert!(after > before);
    }

    #[test]
    fn test_line_order_does_not_change_totals() {
        let items = vec![
            item(dec!(3), dec!(19.99), dec!(5), dec!(25)),
            item(dec!(7), dec!(0.33), dec!(0), dec!(12)),
            item(dec!(1.5), dec!(849.50), dec!(12.5), dec!(6)),
        ];
        let mut reversed = items.clone();
        reversed.reverse();

        assert_eq!(compute(&items, dec!(7.5)), compute(&reversed, dec!(7.5)));
    }

    #[test]
    fn test_large_single_line_does_not_overflow() {
        let items = [LineItem::new("Big", dec!(1000), dec!(1000000000000))];
        assert!(crate::validation::validate_line_items(&items).is_ok());

        let t = compute(&items, dec!(0));
        assert_eq!(t.subtotal, dec!(1000000000000000));
        assert_eq!(t.total_vat, dec!(250000000000000));
        assert_eq!(t.total, dec!(1250000000000000));
    }

    #[test]
    fn test_largest_valid_document_does_not_overflow() {
        let items: Vec<LineItem> = (0..crate::MAX_LINE_ITEMS)
            .map(|_| {
                item(
                    dec!(1000000000000),
                    dec!(1000000000000),
                    dec!(0),
                    dec!(100),
                )
            })
            .collect();
        assert!(crate::validation::validate_line_items(&items).is_ok());

        let t = compute(&items, dec!(10));
        assert_eq!(t.subtotal, dec!(500000000000000000000000000));
        assert_eq!(t.document_discount_amount, dec!(50000000000000000000000000));
        assert_eq!(t.total_vat, dec!(450000000000000000000000000));
        assert_eq!(t.total, dec!(900000000000000000000000000));

        let b = breakdown(&items, dec!(10));
        assert_eq!(b.lines[0].allocated_amount, dec!(900000000000000000000000));
    }
}
