//! Monetary amounts using exact decimal arithmetic.
//!
//! Every price, snapshot price, and order total in the system is a [`Money`].
//! Amounts are `rust_decimal::Decimal` values normalised to two decimal
//! places; floating point never takes part in the arithmetic.
//!
//! On the wire a `Money` is a JSON number (`29.99`). Incoming payloads may
//! carry either a number or a numeric string (`"29.99"`). In `PostgreSQL` it
//! maps to `NUMERIC`.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of fractional digits kept for every amount.
const SCALE: u32 = 2;

/// Errors that can occur when constructing a [`Money`] value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The input could not be parsed as a decimal number.
    #[error("invalid amount: {0}")]
    Invalid(String),
    /// The amount is negative.
    #[error("amount cannot be negative")]
    Negative,
    /// An arithmetic operation overflowed.
    #[error("amount out of range")]
    Overflow,
}

/// A non-negative monetary amount with two decimal places.
///
/// # Examples
///
/// ```
/// use shopdemo_core::Money;
///
/// let unit = Money::parse("10.00").unwrap();
/// let line = unit.checked_mul_qty(2).unwrap();
/// assert_eq!(line, Money::from_cents(2000));
///
/// assert!(Money::parse("-1").is_err());
/// assert!(Money::parse("ten").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal, rounding to two places.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Negative` if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        Ok(Self(normalise(amount)))
    }

    /// Create an amount from an integer number of cents.
    ///
    /// Negative inputs clamp to zero.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents.max(0), SCALE))
    }

    /// Parse an amount from a string such as `"29.99"`.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Invalid` if the string is not a decimal number,
    /// or `MoneyError::Negative` if it is below zero.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| MoneyError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply a unit price by a quantity.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` if the product does not fit.
    pub fn checked_mul_qty(self, quantity: u32) -> Result<Self, MoneyError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(|v| Self(normalise(v)))
            .ok_or(MoneyError::Overflow)
    }

    /// Add two amounts.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` if the sum does not fit.
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(|v| Self(normalise(v)))
            .ok_or(MoneyError::Overflow)
    }
}

fn normalise(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp(SCALE);
    rounded.rescale(SCALE);
    rounded
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Two-place decimals below 10^13 round-trip through f64 exactly as printed.
        let value = self
            .0
            .to_f64()
            .ok_or_else(|| serde::ser::Error::custom("amount not representable"))?;
        serializer.serialize_f64(value)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalises_scale() {
        assert_eq!(Money::parse("10").unwrap().to_string(), "10.00");
        assert_eq!(Money::parse("29.999").unwrap().to_string(), "30.00");
        assert_eq!(Money::parse(" 5.5 ").unwrap().to_string(), "5.50");
    }

    #[test]
    fn test_parse_rejects_negative_and_garbage() {
        assert_eq!(Money::parse("-0.01"), Err(MoneyError::Negative));
        assert!(matches!(Money::parse("abc"), Err(MoneyError::Invalid(_))));
        assert!(Money::parse("-0").is_ok());
    }

    #[test]
    fn test_arithmetic_is_exact() {
        // 0.1 + 0.2 is the classic floating point trap
        let sum = Money::parse("0.10")
            .unwrap()
            .checked_add(Money::parse("0.20").unwrap())
            .unwrap();
        assert_eq!(sum, Money::from_cents(30));

        let line = Money::parse("29.99").unwrap().checked_mul_qty(3).unwrap();
        assert_eq!(line, Money::from_cents(8997));
    }

    #[test]
    fn test_serializes_as_json_number() {
        let json = serde_json::to_string(&Money::from_cents(2499)).unwrap();
        assert_eq!(json, "24.99");
    }

    #[test]
    fn test_deserializes_from_number_or_string() {
        let from_number: Money = serde_json::from_str("399.99").unwrap();
        let from_string: Money = serde_json::from_str("\"399.99\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(from_number, Money::from_cents(39999));
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Money>("-5").is_err());
    }

    #[test]
    fn test_from_cents_clamps_negative() {
        assert_eq!(Money::from_cents(-100), Money::ZERO);
    }
}
