//! Fixed-point currency representation.
//!
//! Amounts are stored as whole minor units (cents). Upstream sources emit
//! JSON numbers in major units, so deserialization rounds to the nearest
//! cent; sub-cent precision in string inputs is rejected rather than
//! silently truncated.

use alloy::primitives::U256;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative monetary amount in minor units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Construct from minor units (cents).
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Construct from whole major units (e.g. dollars).
    pub const fn from_major(units: u64) -> Self {
        Self(units * 100)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    pub fn min(self, other: Money) -> Money {
        Money(self.0.min(other.0))
    }

    /// Apply a coverage rate expressed in basis points (10_000 = 100%).
    ///
    /// Fractional cents are floored; a payable is never rounded up.
    pub fn apply_rate_bps(self, rate_bps: u32) -> Money {
        let scaled = self.0 as u128 * rate_bps as u128 / 10_000;
        Money(scaled.min(u64::MAX as u128) as u64)
    }

    /// Scale to an on-chain fixed-point amount with the given decimals.
    ///
    /// Cents carry 2 decimals already, so the conversion is exact for any
    /// token with `decimals >= 2` (18 for the settlement token).
    pub fn to_token_units(self, decimals: u8) -> U256 {
        debug_assert!(decimals >= 2, "token decimals below cent precision");
        let shift = decimals.saturating_sub(2) as u64;
        U256::from(self.0) * U256::from(10u64).pow(U256::from(shift))
    }

    /// Parse from a major-unit floating point value, rounding to cents.
    pub fn try_from_f64(value: f64) -> Result<Self, MoneyError> {
        if !value.is_finite() || value < 0.0 {
            return Err(MoneyError::Negative);
        }
        let cents = (value * 100.0).round();
        if cents > u64::MAX as f64 {
            return Err(MoneyError::Overflow);
        }
        Ok(Money(cents as u64))
    }

    /// Parse from a decimal string like `"123.45"`.
    ///
    /// More than two fractional digits is an error: the caller sent
    /// precision we cannot represent, and dropping it silently would
    /// understate the amount.
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        let input = input.trim();
        let (whole, frac) = match input.split_once('.') {
            Some((w, f)) => (w, f),
            None => (input, ""),
        };
        if whole.starts_with('-') {
            return Err(MoneyError::Negative);
        }
        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| MoneyError::Malformed)?
        };
        if frac.len() > 2 {
            return Err(MoneyError::SubCentPrecision);
        }
        let frac: u64 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<2}");
            padded.parse().map_err(|_| MoneyError::Malformed)?
        };
        whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(frac))
            .map(Money)
            .ok_or(MoneyError::Overflow)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Errors from parsing or converting monetary values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("amount must be a non-negative finite number")]
    Negative,
    #[error("amount exceeds representable range")]
    Overflow,
    #[error("amount carries sub-cent precision")]
    SubCentPrecision,
    #[error("malformed amount")]
    Malformed,
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Major units for JSON consumers; cents fit f64 exactly up to 2^53.
        serializer.serialize_f64(self.0 as f64 / 100.0)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Money::try_from_f64(v).map_err(de::Error::custom),
            Raw::Text(s) => Money::parse(&s).map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        assert_eq!(Money::parse("123.45").unwrap(), Money::from_cents(12345));
        assert_eq!(Money::parse("500").unwrap(), Money::from_major(500));
        assert_eq!(Money::parse("0.5").unwrap(), Money::from_cents(50));
        assert_eq!(Money::from_cents(12345).to_string(), "123.45");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_parse_rejects_sub_cent_precision() {
        assert_eq!(Money::parse("1.234"), Err(MoneyError::SubCentPrecision));
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert_eq!(Money::parse("-1.00"), Err(MoneyError::Negative));
        assert_eq!(Money::try_from_f64(-0.01), Err(MoneyError::Negative));
    }

    #[test]
    fn test_rate_application_floors() {
        // 80% of $12.34 is 987.2 cents; payable is floored, never rounded up
        assert_eq!(
            Money::from_cents(1234).apply_rate_bps(8_000),
            Money::from_cents(987)
        );
        assert_eq!(
            Money::from_major(1000).apply_rate_bps(8_000),
            Money::from_major(800)
        );
    }

    #[test]
    fn test_token_unit_scaling_is_exact() {
        // $1.00 → 10^18 base units at 18 decimals
        let one = Money::from_major(1).to_token_units(18);
        assert_eq!(one, U256::from(10u64).pow(U256::from(18u64)));

        // $123.45 → 12345 * 10^16, no truncation
        let amount = Money::from_cents(12345).to_token_units(18);
        assert_eq!(
            amount,
            U256::from(12345u64) * U256::from(10u64).pow(U256::from(16u64))
        );
    }

    #[test]
    fn test_json_round_trip() {
        let m: Money = serde_json::from_str("199.99").unwrap();
        assert_eq!(m, Money::from_cents(19999));
        assert_eq!(serde_json::to_string(&m).unwrap(), "199.99");

        let m: Money = serde_json::from_str("\"42.50\"").unwrap();
        assert_eq!(m, Money::from_cents(4250));
    }
}
