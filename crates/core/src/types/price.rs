//! Type-safe unit price representation using decimal arithmetic.
//!
//! Prices are kept at full precision. Rounding to two decimal places happens
//! only when a value is formatted for display via [`format_amount`].

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`UnitPrice`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not decimal text.
    #[error("price is not a decimal number: {0:?}")]
    Malformed(String),
    /// The amount is zero or negative.
    #[error("price must be greater than zero")]
    NotPositive,
    /// The amount is above [`MAX_UNIT_PRICE`].
    #[error("price cannot exceed {MAX_UNIT_PRICE}")]
    TooLarge,
}

/// Highest accepted unit price, in euros.
///
/// Keeps `price * quantity` and cart totals far inside the range of
/// `Decimal` for any `u32` quantity.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// The price of a single unit of a product, in euros.
///
/// ## Constraints
///
/// - Strictly greater than zero
/// - At most [`MAX_UNIT_PRICE`]
/// - Parsed from plain decimal text (`"2.50"`, `"3"`); anything else is rejected
///
/// ## Examples
///
/// ```
/// use cafe_aroma_core::UnitPrice;
///
/// let price = UnitPrice::parse("2.50").unwrap();
/// assert_eq!(price.to_string(), "2.50");
///
/// assert!(UnitPrice::parse("").is_err());
/// assert!(UnitPrice::parse("NaN").is_err());
/// assert!(UnitPrice::parse("0").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct UnitPrice(Decimal);

impl UnitPrice {
    /// Create a unit price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotPositive`] if the amount is zero or negative
    /// and [`PriceError::TooLarge`] if it is above [`MAX_UNIT_PRICE`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }
        if amount > MAX_UNIT_PRICE {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount))
    }

    /// Parse a unit price from decimal text.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, is not decimal text, or is
    /// not strictly positive.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }

        let amount =
            Decimal::from_str(trimmed).map_err(|_| PriceError::Malformed(trimmed.to_owned()))?;

        Self::new(amount)
    }

    /// Returns the amount at full precision.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns the cost of `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }
}

/// Format an amount with exactly two decimal places.
///
/// Midpoints round away from zero (`1.005` becomes `"1.01"`).
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

impl fmt::Display for UnitPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_amount(self.0))
    }
}

impl FromStr for UnitPrice {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for UnitPrice {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<UnitPrice> for Decimal {
    fn from(price: UnitPrice) -> Self {
        price.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_prices() {
        assert_eq!(UnitPrice::parse("2.50").unwrap().amount(), Decimal::new(250, 2));
        assert_eq!(UnitPrice::parse("3").unwrap().amount(), Decimal::from(3));
        assert_eq!(UnitPrice::parse(" 1.8 ").unwrap().amount(), Decimal::new(18, 1));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(UnitPrice::parse("   "), Err(PriceError::Empty));
    }

    #[test]
    fn test_parse_malformed() {
        for text in ["abc", "NaN", "2,50", "1.2.3", "€2"] {
            assert!(
                matches!(UnitPrice::parse(text), Err(PriceError::Malformed(_))),
                "{text} should be malformed"
            );
        }
    }

    #[test]
    fn test_parse_not_positive() {
        assert_eq!(UnitPrice::parse("0"), Err(PriceError::NotPositive));
        assert_eq!(UnitPrice::parse("-1.50"), Err(PriceError::NotPositive));
    }

    #[test]
    fn test_parse_too_large() {
        assert_eq!(UnitPrice::parse("1000000").unwrap().amount(), MAX_UNIT_PRICE);
        assert_eq!(UnitPrice::parse("1000000.01"), Err(PriceError::TooLarge));
        assert_eq!(
            UnitPrice::parse("79228162514264337593543950335"),
            Err(PriceError::TooLarge)
        );
        assert!(serde_json::from_str::<UnitPrice>("\"79228162514264337593543950335\"").is_err());
    }

    #[test]
    fn test_times_at_the_limits() {
        let price = UnitPrice::new(MAX_UNIT_PRICE).unwrap();
        assert_eq!(
            price.times(u32::MAX),
            MAX_UNIT_PRICE * Decimal::from(u32::MAX)
        );
    }

    #[test]
    fn test_times_keeps_precision() {
        let price = UnitPrice::parse("0.333").unwrap();
        assert_eq!(price.times(3), Decimal::new(999, 3));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
        assert_eq!(format_amount(Decimal::from(5)), "5.00");
        assert_eq!(format_amount(Decimal::new(1005, 3)), "1.01");
        assert_eq!(format_amount(Decimal::new(12_344, 3)), "12.34");
    }

    #[test]
    fn test_display() {
        let price = UnitPrice::parse("1.8").unwrap();
        assert_eq!(format!("{price}"), "1.80");
    }

    #[test]
    fn test_deserialize_rejects_non_positive() {
        assert!(serde_json::from_str::<UnitPrice>("\"0\"").is_err());
        assert!(serde_json::from_str::<UnitPrice>("\"-2\"").is_err());
        assert!(serde_json::from_str::<UnitPrice>("\"2.50\"").is_ok());
    }
}
