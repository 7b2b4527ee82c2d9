//! Amount type for handling signed monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. It parses values that may carry a
//! currency prefix and thousands separators, and it always writes a plain decimal with two
//! fractional digits so that the ledger file stays easy to read with other tools.

use crate::model::Direction;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Represents a signed amount of money. Positive values are income and negative values are
/// expenses.
///
/// # Examples
///
/// Parsing with a currency prefix:
/// ```
/// # use pocket_ledger::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-R$ 1,250.5").unwrap();
/// assert_eq!(amount.to_string(), "-1250.50");
/// ```
///
/// Formatting for display:
/// ```
/// # use pocket_ledger::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-60000").unwrap();
/// assert_eq!(amount.display_with("$"), "-$60,000.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const ZERO: Amount = Amount::new(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates a signed amount from a magnitude and the direction of the money flow. The sign of
    /// `magnitude` is ignored.
    pub fn signed(magnitude: Decimal, direction: Direction) -> Self {
        let abs = magnitude.abs();
        match direction {
            Direction::Income => Self::new(abs),
            Direction::Expense => Self::new(-abs),
        }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns the absolute value.
    pub fn magnitude(&self) -> Decimal {
        self.value.abs()
    }

    /// Returns the direction implied by the sign. Zero is treated as income.
    pub fn direction(&self) -> Direction {
        if self.is_negative() {
            Direction::Expense
        } else {
            Direction::Income
        }
    }

    /// Returns a new amount with the same sign as `self` and the given magnitude.
    pub fn with_magnitude(&self, magnitude: Decimal) -> Self {
        Self::signed(magnitude, self.direction())
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value().is_sign_positive()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }

    /// Formats the amount for people to read, e.g. `-$1,234.50` when `currency` is `$`.
    pub fn display_with(&self, currency: &str) -> String {
        format_money(self.value, currency)
    }
}

/// Formats a decimal with a currency prefix and thousands separators, e.g. `-R$ 1,234.50`.
///
/// The grouping goes through `f64`, so cents are only exact for magnitudes below about 2^53 / 100.
/// Parsed amounts are capped at `MAX_MAGNITUDE`, well inside that range.
pub fn format_money(value: Decimal, currency: &str) -> String {
    let rounded = value.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let num = format_num::format_num!(",.2", rounded.abs().to_f64().unwrap_or_default());
    format!("{sign}{currency}{num}")
}

/// The largest magnitude an `Amount` may be parsed from. Sums of any realistic number of rows stay
/// far below `Decimal::MAX`.
pub const MAX_MAGNITUDE: i64 = 1_000_000_000_000;

/// An error that can occur when parsing strings into `Amount` values.
#[derive(Debug)]
pub enum AmountError {
    /// The digits are not a decimal number.
    Decimal(rust_decimal::Error),
    /// The value has a sign both before and after the currency prefix, e.g. `-$-5`.
    Sign(String),
    /// The magnitude is larger than `MAX_MAGNITUDE`.
    TooLarge(String),
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Decimal(e) => Display::fmt(e, f),
            AmountError::Sign(s) => write!(f, "The amount '{s}' has more than one sign"),
            AmountError::TooLarge(s) => {
                write!(f, "The amount '{s}' is larger than {MAX_MAGNITUDE}")
            }
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AmountError::Decimal(e) => Some(e),
            _ => None,
        }
    }
}

/// Splits a leading `-` or `+` off `s`. The flag is `Some(true)` for a minus sign.
fn split_sign(s: &str) -> (Option<bool>, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (Some(true), rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (Some(false), rest)
    } else {
        (None, s)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (outer, rest) = split_sign(trimmed);

        // Drop a currency prefix such as "$", "R$" or "€ ". A sign may follow it, e.g. "R$ -50".
        let rest = rest.trim_start_matches(|c: char| {
            !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
        });
        let (inner, digits) = split_sign(rest);

        let negative = match (outer, inner) {
            (Some(_), Some(_)) => return Err(AmountError::Sign(trimmed.to_string())),
            (Some(negative), None) | (None, Some(negative)) => negative,
            (None, None) => false,
        };

        let digits = digits.trim().replace(',', "");
        let value = Decimal::from_str(&digits).map_err(AmountError::Decimal)?;
        if value > Decimal::from(MAX_MAGNITUDE) {
            return Err(AmountError::TooLarge(trimmed.to_string()));
        }
        Ok(Amount::new(if negative { -value } else { value }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut v = self.value.round_dp(2);
        v.rescale(2);
        if v.is_zero() {
            // Avoid writing "-0.00".
            v.set_sign_positive(true);
        }
        write!(f, "{v}")
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("50.00").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_parse_negative_with_currency() {
        let amount = Amount::from_str("-$50.00").unwrap();
        assert_eq!(amount.value(), dec("-50.00"));
    }

    #[test]
    fn test_parse_multi_char_currency_and_commas() {
        let amount = Amount::from_str("R$ 1,234,567.89").unwrap();
        assert_eq!(amount.value(), dec("1234567.89"));
    }

    #[test]
    fn test_parse_sign_after_currency() {
        let amount = Amount::from_str("R$ -50.00").unwrap();
        assert_eq!(amount.value(), dec("-50.00"));
        let amount = Amount::from_str("$-12.5").unwrap();
        assert!(amount.is_negative());
        assert_eq!(amount.value(), dec("-12.5"));
        assert_eq!(Amount::from_str("$+7").unwrap().value(), dec("7"));
    }

    #[test]
    fn test_parse_two_signs_is_error() {
        assert!(matches!(
            Amount::from_str("-$-5"),
            Err(AmountError::Sign(_))
        ));
    }

    #[test]
    fn test_parse_too_large_is_error() {
        assert!(matches!(
            Amount::from_str("79228162514264337593543950335"),
            Err(AmountError::TooLarge(_))
        ));
        assert!(matches!(
            Amount::from_str("-$1,000,000,000,000.01"),
            Err(AmountError::TooLarge(_))
        ));
        let max = Amount::from_str("1,000,000,000,000").unwrap();
        assert_eq!(max.value(), Decimal::from(MAX_MAGNITUDE));
    }

    #[test]
    fn test_parse_whitespace() {
        let amount = Amount::from_str("  12.5  ").unwrap();
        assert_eq!(amount.value(), dec("12.5"));
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(Amount::from_str("abc").is_err());
        assert!(Amount::from_str("").is_err());
    }

    #[test]
    fn test_display_two_places() {
        assert_eq!(Amount::new(dec("-12.5")).to_string(), "-12.50");
        assert_eq!(Amount::new(dec("3")).to_string(), "3.00");
        assert_eq!(Amount::new(dec("0.005")).to_string(), "0.00");
    }

    #[test]
    fn test_display_negative_zero() {
        assert_eq!(Amount::new(dec("-0.001")).to_string(), "0.00");
    }

    #[test]
    fn test_display_with_currency() {
        assert_eq!(Amount::new(dec("1234.5")).display_with("$"), "$1,234.50");
        assert_eq!(Amount::new(dec("-20")).display_with("R$ "), "-R$ 20.00");
    }

    #[test]
    fn test_signed() {
        assert_eq!(
            Amount::signed(dec("10"), Direction::Income).value(),
            dec("10")
        );
        assert_eq!(
            Amount::signed(dec("10"), Direction::Expense).value(),
            dec("-10")
        );
        // The sign of the magnitude does not matter.
        assert_eq!(
            Amount::signed(dec("-10"), Direction::Income).value(),
            dec("10")
        );
    }

    #[test]
    fn test_with_magnitude_keeps_sign() {
        let expense = Amount::new(dec("-40"));
        assert_eq!(expense.with_magnitude(dec("15")).value(), dec("-15"));
        let income = Amount::new(dec("40"));
        assert_eq!(income.with_magnitude(dec("15")).value(), dec("15"));
    }

    #[test]
    fn test_zero_is_not_positive_or_negative() {
        let zero = Amount::ZERO;
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
        assert!(zero.is_zero());
    }

    #[test]
    fn test_serialize() {
        let amount = Amount::new(dec("-50"));
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"-50.00\"");
    }

    #[test]
    fn test_deserialize_with_currency() {
        let amount: Amount = serde_json::from_str("\"-$50.00\"").unwrap();
        assert_eq!(amount.value(), dec("-50.00"));
    }
}
