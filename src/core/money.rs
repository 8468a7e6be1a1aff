//! Advance / balance split of a mission total.
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonetaryDecomposition {
    pub total: Decimal,
    pub advance_rate_percent: Decimal,
    pub advance: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmountError {
    NegativeTotal,
    RateOutOfRange,
}

impl Display for AmountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                AmountError::NegativeTotal => "total amount cannot be negative",
                AmountError::RateOutOfRange => "advance rate must be between 0 and 100",
            }
        )
    }
}

/// Splits `total` into an advance of `rate` percent, rounded half-up to whole
/// units, and a balance that absorbs the rounding remainder.
///
/// A rate outside `[0, 100]` is clamped; [`validate_amounts`] reports it.
pub fn decompose(total: Decimal, advance_rate_percent: Decimal) -> MonetaryDecomposition {
    let rate = advance_rate_percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    // |raw| <= |total| since the factor is at most one
    let raw = total * (rate / Decimal::ONE_HUNDRED);
    let advance = round_half_up(raw);

    MonetaryDecomposition {
        total,
        advance_rate_percent: rate,
        advance,
        balance: total - advance,
    }
}

/// Amount errors in a stable order: total first, then rate.
pub fn validate_amounts(total: Decimal, advance_rate_percent: Decimal) -> Vec<AmountError> {
    let mut errors = Vec::new();
    if total.is_sign_negative() && !total.is_zero() {
        errors.push(AmountError::NegativeTotal);
    }
    if advance_rate_percent < Decimal::ZERO || advance_rate_percent > Decimal::ONE_HUNDRED {
        errors.push(AmountError::RateOutOfRange);
    }
    errors
}

fn round_half_up(value: Decimal) -> Decimal {
    value
        .checked_add(Decimal::new(5, 1))
        .map(|shifted| shifted.floor())
        .unwrap_or_else(|| value.round())
}
