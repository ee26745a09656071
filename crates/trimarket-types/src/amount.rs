//! Fungible amounts in smallest units.
//!
//! Prices and balances are integers of the token's smallest unit, so they are
//! exact up to the largest possible supply. Decimal conversion exists only at
//! the edges (parsing user input, formatting for display).

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MarketError, Result};

/// An amount of the fungible token, in smallest units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct Amount(pub u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    /// Largest amount. As an allowance it means "unlimited" and is never decremented.
    pub const MAX: Self = Self(u128::MAX);

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    #[must_use]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    #[must_use]
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Convert a human-readable decimal (e.g. `"0.1"`) into smallest units.
    ///
    /// Rejects negative values and values with more fractional digits than
    /// `decimals`, since either would lose precision.
    pub fn parse_units(value: &str, decimals: u32) -> Result<Self> {
        let parsed = Decimal::from_str(value.trim())
            .map_err(|e| MarketError::InvalidAmount(format!("{value:?}: {e}")))?;
        Self::from_decimal(parsed, decimals)
    }

    /// Convert a [`Decimal`] into smallest units.
    pub fn from_decimal(value: Decimal, decimals: u32) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(MarketError::InvalidAmount(format!("{value} is negative")));
        }
        let value = value.normalize();
        let scale = value.scale();
        if scale > decimals {
            return Err(MarketError::InvalidAmount(format!(
                "{value} has more than {decimals} fractional digits"
            )));
        }
        let mantissa = value.mantissa().unsigned_abs();
        10u128
            .checked_pow(decimals - scale)
            .and_then(|factor| mantissa.checked_mul(factor))
            .map(Self)
            .ok_or(MarketError::AmountOverflow)
    }

    /// This amount as a [`Decimal`] with `decimals` fractional digits.
    ///
    /// Fails for amounts beyond the 96-bit mantissa of `Decimal`.
    pub fn to_decimal(self, decimals: u32) -> Result<Decimal> {
        let raw = i128::try_from(self.0).map_err(|_| MarketError::AmountOverflow)?;
        Decimal::try_from_i128_with_scale(raw, decimals)
            .map(|d| d.normalize())
            .map_err(|_| MarketError::AmountOverflow)
    }

    /// Human-readable form, e.g. `"0.1"` for `10^17` at 18 decimals.
    #[must_use]
    pub fn format_units(self, decimals: u32) -> String {
        match self.to_decimal(decimals) {
            Ok(d) => d.to_string(),
            Err(_) => format!("{}e-{decimals}", self.0),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ETHER: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn parse_tenth_of_a_token() {
        let amount = Amount::parse_units("0.1", 18).unwrap();
        assert_eq!(amount, Amount(ETHER / 10));
    }

    #[test]
    fn parse_whole_and_trailing_zeros() {
        assert_eq!(Amount::parse_units("1", 18).unwrap(), Amount(ETHER));
        assert_eq!(Amount::parse_units("1.500", 18).unwrap(), Amount(ETHER * 3 / 2));
        assert_eq!(Amount::parse_units("0", 18).unwrap(), Amount::ZERO);
    }

    #[test]
    fn parse_rejects_excess_precision() {
        let err = Amount::parse_units("0.001", 2).unwrap_err();
        assert!(matches!(err, MarketError::InvalidAmount(_)));
    }

    #[test]
    fn parse_rejects_negative_and_garbage() {
        assert!(matches!(
            Amount::parse_units("-1", 18).unwrap_err(),
            MarketError::InvalidAmount(_)
        ));
        assert!(matches!(
            Amount::parse_units("abc", 18).unwrap_err(),
            MarketError::InvalidAmount(_)
        ));
    }

    #[test]
    fn format_units_is_inverse_of_parse() {
        let amount = Amount::parse_units("12.345", 18).unwrap();
        assert_eq!(amount.format_units(18), "12.345");
        assert_eq!(Amount(ETHER / 10).format_units(18), "0.1");
    }

    #[test]
    fn format_units_beyond_decimal_range() {
        assert_eq!(Amount::MAX.format_units(18), format!("{}e-18", u128::MAX));
        assert!(matches!(
            Amount::MAX.to_decimal(18).unwrap_err(),
            MarketError::AmountOverflow
        ));
    }

    #[test]
    fn checked_arithmetic() {
        assert_eq!(Amount(5).checked_add(Amount(7)), Some(Amount(12)));
        assert_eq!(Amount::MAX.checked_add(Amount(1)), None);
        assert_eq!(Amount(5).checked_sub(Amount(7)), None);
        assert_eq!(Amount(5).saturating_sub(Amount(7)), Amount::ZERO);
    }

    #[test]
    fn amount_serde_roundtrip() {
        let amount = Amount(ETHER);
        let json = serde_json::to_string(&amount).unwrap();
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(amount, back);
    }
}
