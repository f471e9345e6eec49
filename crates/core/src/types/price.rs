//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PriceError {
    /// Prices cannot be negative.
    #[error("price cannot be negative")]
    Negative,
    /// The input string is not a decimal number.
    #[error("not a valid decimal amount: {0}")]
    NotANumber(String),
}

/// A non-negative monetary amount.
///
/// Prices use [`Decimal`] arithmetic throughout so quantities like `0.5` kg
/// multiply exactly; with the `serde-with-str` feature the amount round-trips
/// through JSON as a string, which keeps storage layers from degrading it to
/// a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] for negative amounts.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// Parse a price from a decimal string such as `"189.50"`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotANumber`] if the string does not parse, or
    /// [`PriceError::Negative`] for negative amounts.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount: Decimal = s
            .trim()
            .parse()
            .map_err(|_| PriceError::NotANumber(s.to_owned()))?;
        Self::new(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a quantity, e.g. to compute a cart line total.
    #[must_use]
    pub fn times(&self, quantity: Decimal) -> Decimal {
        self.0 * quantity
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are constrained non-negative by a CHECK
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
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

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_rejects_negative() {
        assert!(Price::new(d("-1")).is_err());
        assert!(Price::new(Decimal::ZERO).is_ok());
        assert!(Price::new(d("189.50")).is_ok());
    }

    #[test]
    fn test_parse() {
        assert_eq!(Price::parse("189.50").unwrap().amount(), d("189.50"));
        assert_eq!(Price::parse(" 10 ").unwrap().amount(), d("10"));
        assert!(matches!(Price::parse("abc"), Err(PriceError::NotANumber(_))));
        assert!(matches!(Price::parse("-5"), Err(PriceError::Negative)));
    }

    #[test]
    fn test_times_is_exact() {
        let price = Price::parse("189.50").unwrap();
        assert_eq!(price.times(d("0.5")), d("94.750"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::parse("189.5").unwrap().to_string(), "$189.50");
    }

    #[test]
    fn test_serde_as_string() {
        let price = Price::parse("189.50").unwrap();
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"189.50\"");

        let parsed: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, price);
    }
}
