//! Prices
//!
//! Monetary amounts are held in minor units (pence/cents) so pricing
//! arithmetic never touches binary floating point.

use std::fmt::{Display, Formatter, Result as FmtResult};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when converting external input into a [`Price`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    /// Input was not a decimal number.
    #[error("not a decimal amount")]
    NotDecimal,

    /// Amount was negative.
    #[error("amount is negative")]
    Negative,

    /// Amount carried more than two fractional digits.
    #[error("amount has more than two decimal places")]
    TooPrecise,

    /// Amount does not fit in minor units.
    #[error("amount out of range")]
    OutOfRange,
}

/// A non-negative price in minor units of a two-decimal currency.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    pub const ZERO: Self = Self(0);

    /// Creates a price from minor units.
    #[must_use]
    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub const fn minor(self) -> u64 {
        self.0
    }

    /// Parses a decimal string such as `"50.00"` into a price.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] for non-decimal input, negative amounts,
    /// more than two fractional digits, or amounts outside `u64` minor units.
    pub fn parse_decimal(input: &str) -> Result<Self, PriceError> {
        let amount: Decimal = input.trim().parse().map_err(|_| PriceError::NotDecimal)?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }

        if amount.scale() > 2 {
            return Err(PriceError::TooPrecise);
        }

        let minor = amount
            .checked_mul(Decimal::from(100_u32))
            .ok_or(PriceError::OutOfRange)?
            .trunc();

        u64::try_from(minor).map_or(Err(PriceError::OutOfRange), |value| Ok(Self(value)))
    }

    /// Checked addition.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Checked multiplication by a quantity.
    #[must_use]
    pub const fn checked_mul(self, qty: u32) -> Option<Self> {
        match self.0.checked_mul(qty as u64) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Subtraction that floors at zero; monetary amounts stay non-negative.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl From<u64> for Price {
    fn from(minor: u64) -> Self {
        Self(minor)
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_two_decimal_amounts() -> TestResult {
        assert_eq!(Price::parse_decimal("50.00")?, Price::from_minor(5000));
        assert_eq!(Price::parse_decimal("0.05")?, Price::from_minor(5));
        assert_eq!(Price::parse_decimal("19.9")?, Price::from_minor(1990));
        assert_eq!(Price::parse_decimal("7")?, Price::from_minor(700));

        Ok(())
    }

    #[test]
    fn rejects_negative_amounts() {
        assert_eq!(Price::parse_decimal("-1.00"), Err(PriceError::Negative));
    }

    #[test]
    fn rejects_three_decimal_places() {
        assert_eq!(Price::parse_decimal("1.005"), Err(PriceError::TooPrecise));
    }

    #[test]
    fn rejects_non_decimal_input() {
        assert_eq!(Price::parse_decimal("abc"), Err(PriceError::NotDecimal));
    }

    #[test]
    fn displays_as_two_decimal_currency() {
        assert_eq!(Price::from_minor(5000).to_string(), "50.00");
        assert_eq!(Price::from_minor(5).to_string(), "0.05");
    }

    #[test]
    fn saturating_sub_floors_at_zero() {
        let result = Price::from_minor(100).saturating_sub(Price::from_minor(250));

        assert_eq!(result, Price::ZERO);
    }

    #[test]
    fn checked_mul_detects_overflow() {
        assert_eq!(Price::from_minor(u64::MAX).checked_mul(2), None);
    }

    #[test]
    fn serializes_as_minor_units() -> TestResult {
        let json = serde_json::to_string(&Price::from_minor(5000))?;

        assert_eq!(json, "5000");

        Ok(())
    }
}
