//! Monetary arithmetic over fixed-point decimals.
//!
//! All amounts are `rust_decimal::Decimal` to avoid binary floating-point
//! drift. Totals are rounded to 2 decimal places (banker's rounding is not
//! used; half-way cases round away from zero, matching what customers expect
//! on a receipt).

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places for stored and displayed amounts.
pub const AMOUNT_SCALE: u32 = 2;

/// Extended price of a single line: `unit_price * quantity`.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Sum of line extended prices, rounded to 2 decimal places.
///
/// An empty iterator yields zero.
#[must_use]
pub fn order_total<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, i32)>,
{
    let sum: Decimal = lines
        .into_iter()
        .map(|(price, quantity)| line_total(price, quantity))
        .sum();

    sum.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount as a 2-decimal string (e.g. `"25.00"`).
///
/// This is the wire format for order totals.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("{amount:.2}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(dec("10.00"), 2), dec("20.00"));
        assert_eq!(line_total(dec("0.99"), 3), dec("2.97"));
    }

    #[test]
    fn test_order_total_example() {
        // Cart = [{qty 2, price 10.00}, {qty 1, price 5.00}] -> 25.00
        let total = order_total([(dec("10.00"), 2), (dec("5.00"), 1)]);
        assert_eq!(format_amount(total), "25.00");
    }

    #[test]
    fn test_order_total_empty() {
        assert_eq!(format_amount(order_total([])), "0.00");
    }

    #[test]
    fn test_order_total_rounds_to_two_places() {
        // 3 x 3.333 = 9.999 -> 10.00
        let total = order_total([(dec("3.333"), 3)]);
        assert_eq!(format_amount(total), "10.00");
    }

    #[test]
    fn test_order_total_no_float_drift() {
        // 0.1 + 0.2 is exactly 0.3 in decimal arithmetic
        let total = order_total([(dec("0.1"), 1), (dec("0.2"), 1)]);
        assert_eq!(total, dec("0.30"));
    }

    #[test]
    fn test_format_amount_pads_scale() {
        assert_eq!(format_amount(dec("25")), "25.00");
        assert_eq!(format_amount(dec("5.5")), "5.50");
    }
}
