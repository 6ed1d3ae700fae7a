//! # Native Amounts
//!
//! Decimal amounts of the network's native currency and their conversion
//! to and from integer base units (wei-like units).
//!
//! # Examples
//!
//! ```
//! use testnet_autosender::domain::value_objects::amount::NativeAmount;
//!
//! let amount: NativeAmount = "0.15".parse().unwrap();
//! assert_eq!(amount.to_base_units(18).unwrap(), 150_000_000_000_000_000);
//!
//! let back = NativeAmount::from_base_units(150_000_000_000_000_000, 18).unwrap();
//! assert_eq!(back, amount);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest number of decimals a [`Decimal`] can carry.
pub const MAX_DECIMALS: u32 = 28;

/// Number of fractional digits used when presenting balances.
pub const DISPLAY_PRECISION: u32 = 4;

/// Error type for amount parsing and conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The amount is negative.
    #[error("amount must not be negative: {0}")]
    Negative(Decimal),

    /// The string is not a decimal number.
    #[error("invalid amount: {0}")]
    Parse(String),

    /// The amount has more fractional digits than the currency supports.
    #[error("amount {amount} has more than {decimals} fractional digits")]
    TooPrecise {
        /// Offending amount.
        amount: Decimal,
        /// Currency decimals.
        decimals: u32,
    },

    /// The value does not fit the target representation.
    #[error("amount overflow")]
    Overflow,

    /// Currency decimals outside the supported range.
    #[error("unsupported currency decimals: {0}")]
    UnsupportedDecimals(u32),
}

/// Result type for amount operations.
pub type AmountResult<T> = Result<T, AmountError>;

/// A non-negative amount of native currency in decimal units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct NativeAmount(Decimal);

impl NativeAmount {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// One whole unit of native currency.
    pub const ONE: Self = Self(Decimal::ONE);

    /// Creates `mantissa * 10^-scale` units, e.g. `from_scaled(15, 2)` is 0.15.
    ///
    /// `scale` must not exceed 28.
    #[must_use]
    pub const fn from_scaled(mantissa: u32, scale: u32) -> Self {
        Self(Decimal::from_parts(mantissa, 0, 0, false, scale))
    }

    /// Creates a new amount.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Negative`] if `value` is below zero.
    pub fn new(value: Decimal) -> AmountResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }
        Ok(Self(value.normalize()))
    }

    /// Returns the underlying decimal value.
    #[inline]
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Converts the amount to integer base units.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::TooPrecise`] if the amount cannot be expressed
    /// exactly with `decimals` fractional digits, and [`AmountError::Overflow`]
    /// if the result does not fit in a `u128`.
    pub fn to_base_units(&self, decimals: u32) -> AmountResult<u128> {
        let value = self.0.normalize();
        let mantissa = value.mantissa();
        let scale = value.scale();

        let units = if scale <= decimals {
            let factor = pow10(decimals - scale)?;
            mantissa.checked_mul(factor).ok_or(AmountError::Overflow)?
        } else {
            let divisor = pow10(scale - decimals)?;
            if mantissa % divisor != 0 {
                return Err(AmountError::TooPrecise {
                    amount: value,
                    decimals,
                });
            }
            mantissa / divisor
        };

        u128::try_from(units).map_err(|_| AmountError::Overflow)
    }

    /// Creates an amount from integer base units.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::UnsupportedDecimals`] if `decimals` exceeds
    /// [`MAX_DECIMALS`] and [`AmountError::Overflow`] if the value does not
    /// fit a decimal.
    pub fn from_base_units(units: u128, decimals: u32) -> AmountResult<Self> {
        if decimals > MAX_DECIMALS {
            return Err(AmountError::UnsupportedDecimals(decimals));
        }
        let units = i128::try_from(units).map_err(|_| AmountError::Overflow)?;
        let value = Decimal::try_from_i128_with_scale(units, decimals)
            .map_err(|_| AmountError::Overflow)?;
        Ok(Self(value.normalize()))
    }

    /// Formats the amount with [`DISPLAY_PRECISION`] fractional digits.
    #[must_use]
    pub fn display_rounded(&self) -> String {
        let rounded = self.0.round_dp(DISPLAY_PRECISION);
        format!("{:.prec$}", rounded, prec = DISPLAY_PRECISION as usize)
    }
}

fn pow10(exp: u32) -> AmountResult<i128> {
    10i128.checked_pow(exp).ok_or(AmountError::Overflow)
}

impl fmt::Display for NativeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NativeAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|e| AmountError::Parse(e.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<Decimal> for NativeAmount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NativeAmount> for Decimal {
    fn from(amount: NativeAmount) -> Self {
        amount.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const WEI: u32 = 18;

    #[test]
    fn from_scaled_matches_parsed() {
        assert_eq!(NativeAmount::from_scaled(15, 2), "0.15".parse().unwrap());
        assert_eq!(NativeAmount::from_scaled(1, 0), NativeAmount::ONE);
    }

    #[test]
    fn parses_and_converts_transfer_amount() {
        let amount: NativeAmount = "0.15".parse().unwrap();
        assert_eq!(amount.to_base_units(WEI).unwrap(), 150_000_000_000_000_000);
    }

    #[test]
    fn one_unit_in_base_units() {
        assert_eq!(
            NativeAmount::ONE.to_base_units(WEI).unwrap(),
            1_000_000_000_000_000_000
        );
    }

    #[test]
    fn rejects_negative() {
        let result = "-1".parse::<NativeAmount>();
        assert!(matches!(result, Err(AmountError::Negative(_))));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            "one".parse::<NativeAmount>(),
            Err(AmountError::Parse(_))
        ));
    }

    #[test]
    fn too_precise_for_currency() {
        let amount: NativeAmount = "0.0000001".parse().unwrap();
        assert!(matches!(
            amount.to_base_units(6),
            Err(AmountError::TooPrecise { .. })
        ));
    }

    #[test]
    fn trailing_zeros_are_not_precision() {
        let amount: NativeAmount = "1.500000".parse().unwrap();
        assert_eq!(amount.to_base_units(1).unwrap(), 15);
    }

    #[test]
    fn from_base_units_normalizes() {
        let amount = NativeAmount::from_base_units(1_200_000_000_000_000_000, WEI).unwrap();
        assert_eq!(amount.to_string(), "1.2");
    }

    #[test]
    fn from_base_units_rejects_wide_decimals() {
        assert_eq!(
            NativeAmount::from_base_units(1, 30),
            Err(AmountError::UnsupportedDecimals(30))
        );
    }

    #[test]
    fn display_rounded_uses_four_digits() {
        let amount: NativeAmount = "0.123456".parse().unwrap();
        assert_eq!(amount.display_rounded(), "0.1235");
        assert_eq!(NativeAmount::ZERO.display_rounded(), "0.0000");
    }

    #[test]
    fn ordering_compares_values() {
        let half: NativeAmount = "0.5".parse().unwrap();
        let fee: NativeAmount = "0.15".parse().unwrap();
        assert!(half > fee);
        assert!(NativeAmount::ONE > half);
    }

    #[test]
    fn serde_accepts_string() {
        let amount: NativeAmount = serde_json::from_str("\"0.15\"").unwrap();
        assert_eq!(amount, "0.15".parse().unwrap());
    }

    proptest! {
        #[test]
        fn base_units_survive_conversion(units in 0u128..10u128.pow(27)) {
            let amount = NativeAmount::from_base_units(units, WEI).unwrap();
            prop_assert_eq!(amount.to_base_units(WEI).unwrap(), units);
        }
    }
}
