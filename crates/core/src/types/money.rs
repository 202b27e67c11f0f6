//! Decimal money arithmetic.
//!
//! Prices are carried as [`rust_decimal::Decimal`] in major currency units
//! (e.g. dirhams, dollars) everywhere except at the payment-provider
//! boundary, which requires integer minor units (e.g. fils, cents).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Errors converting decimal amounts to minor units.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount does not fit in an `i64` after scaling.
    #[error("amount out of range for minor units: {0}")]
    OutOfRange(Decimal),
}

/// Convert a major-unit decimal amount to integer minor units.
///
/// Uses round-half-up (away from zero), not truncation: a unit price of
/// 19.995 becomes 2000 minor units, never 1999. Truncation would
/// systematically underprice every line item.
///
/// # Errors
///
/// Returns [`MoneyError::OutOfRange`] if the scaled amount overflows `i64`.
pub fn to_minor_units(amount: Decimal) -> Result<i64, MoneyError> {
    let scaled = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(MoneyError::OutOfRange(amount))?;
    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(MoneyError::OutOfRange(amount))
}

/// Format a major-unit amount for display, e.g. `"AED 50.00"`.
///
/// Used in customer-facing messages (coupon minimum/maximum spend) where the
/// backend stores bare decimals.
#[must_use]
pub fn format_amount(currency: &str, amount: Decimal) -> String {
    format!("{currency} {:.2}", amount.round_dp(2))
}
