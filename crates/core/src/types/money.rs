//! Money formatting for display.
//!
//! The LapShop API wires all prices as plain JSON numbers denominated in
//! Vietnamese dong, so there is no currency field to carry around. What the
//! client needs is the display form: dot-grouped thousands with a trailing
//! dong sign (`1.300.000 ₫`), rounded to whole dong.

use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount as Vietnamese dong, e.g. `1.300.000 ₫`.
///
/// Rounds to whole dong with midpoint-away-from-zero, matching how the
/// storefront has always displayed prices.
#[must_use]
pub fn format_vnd(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().to_string();
    let len = digits.len();

    let mut grouped = String::with_capacity(len + len / 3 + 4);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (len - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped.push_str(" ₫");
    grouped
}

/// Format an optional amount, falling back to `0 ₫` when absent.
#[must_use]
pub fn format_vnd_opt(amount: Option<Decimal>) -> String {
    amount.map_or_else(|| "0 ₫".to_owned(), format_vnd)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    #[test]
    fn test_groups_thousands_with_dots() {
        assert_eq!(format_vnd(Decimal::from(1_300_000)), "1.300.000 ₫");
        assert_eq!(format_vnd(Decimal::from(25_990_000)), "25.990.000 ₫");
    }

    #[test]
    fn test_small_amounts_ungrouped() {
        assert_eq!(format_vnd(Decimal::from(500)), "500 ₫");
        assert_eq!(format_vnd(Decimal::ZERO), "0 ₫");
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        let amount = Decimal::from_f64(1234.5).unwrap();
        assert_eq!(format_vnd(amount), "1.235 ₫");
    }

    #[test]
    fn test_negative_amounts() {
        assert_eq!(format_vnd(Decimal::from(-1_500)), "-1.500 ₫");
    }

    #[test]
    fn test_missing_amount_falls_back_to_zero() {
        assert_eq!(format_vnd_opt(None), "0 ₫");
        assert_eq!(format_vnd_opt(Some(Decimal::from(42))), "42 ₫");
    }
}
