//! Fixed-point money helpers.
//!
//! Prices are `Decimal` with two fractional digits everywhere inside the
//! crate. Conversion to integer cents only happens when a checkout request is
//! built, and always rounds half-up so an order is never undercharged.

use rust_decimal::prelude::*;

use super::validation::ValidationError;

const DECIMAL_PLACES: u32 = 2;

/// Builds a two-place decimal from a whole number of cents.
pub const fn usd(cents: u32) -> Decimal {
    Decimal::from_parts(cents, 0, 0, false, DECIMAL_PLACES)
}

/// Rounds a money value to cents, half-up.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a decimal amount into integer minor units (cents).
pub fn to_cents(value: Decimal) -> Result<i64, ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::AmountOutOfRange(value));
    }
    value
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(ValidationError::AmountOutOfRange(value))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(ValidationError::AmountOutOfRange(value))
}

pub fn format_usd(value: Decimal) -> String {
    format!("${:.2}", round_money(value))
}
