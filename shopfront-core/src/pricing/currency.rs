//! Naira amounts: rounding, clamping and display.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Smallest currency unit is the kobo, 1/100 of a naira.
pub const CURRENCY_DECIMALS: u32 = 2;

pub const CURRENCY_SYMBOL: &str = "₦";

/// Round to kobo, half-up.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Clamp negative inputs to zero.
pub fn non_negative(amount: Decimal) -> Decimal {
    amount.max(Decimal::ZERO)
}

/// Render an amount the way the storefront shows prices.
///
/// Whole amounts drop the kobo: `₦10,000`, otherwise `₦1,250.50`.
pub fn format_naira(amount: Decimal) -> String {
    let amount = round_currency(amount);
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    let abs = amount.abs();
    let whole = abs.trunc();
    let kobo = ((abs - whole) * Decimal::ONE_HUNDRED).to_u32().unwrap_or(0);
    let grouped = group_thousands(&whole.normalize().to_string());

    if kobo == 0 {
        format!("{sign}{CURRENCY_SYMBOL}{grouped}")
    } else {
        format!("{sign}{CURRENCY_SYMBOL}{grouped}.{kobo:02}")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
