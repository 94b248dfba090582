//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are amounts in Thai baht. The catalog never carries negative
//! prices, so construction is fallible and every `Price` in the system is
//! known to be `>= 0`.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative amount in baht.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Zero baht.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount < 0`.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of baht.
    #[must_use]
    pub fn whole(baht: u32) -> Self {
        Self(Decimal::from(baht))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The largest representable amount. Arithmetic saturates here.
    pub const MAX: Self = Self(Decimal::MAX);

    /// Price of `quantity` units at this unit price, saturating at [`Price::MAX`].
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map_or(Self::MAX, Self)
    }

    /// Sum of two prices, or `None` if it exceeds [`Price::MAX`].
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Format as currency, e.g. `฿1,234.00`.
    ///
    /// Always two fraction digits, matching the `th-TH` currency style.
    /// Halves round away from zero.
    #[must_use]
    pub fn format_currency(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let fixed = format!("{rounded:.2}");
        let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
        format!("฿{}.{fraction}", group_thousands(whole))
    }

    /// Format as a plain grouped number, e.g. `1,234` or `1,234.5`.
    ///
    /// Trailing zeros are dropped and at most three fraction digits are kept.
    #[must_use]
    pub fn format_plain(&self) -> String {
        let normalized = self
            .0
            .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
            .normalize()
            .to_string();
        match normalized.split_once('.') {
            Some((whole, fraction)) => format!("{}.{fraction}", group_thousands(whole)),
            None => group_thousands(&normalized),
        }
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    /// Saturates at [`Price::MAX`].
    fn add(self, rhs: Self) -> Self::Output {
        self.checked_add(rhs).unwrap_or(Self::MAX)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_plain())
    }
}

/// Insert `,` between groups of three digits.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_rejects_negative() {
        assert_eq!(
            Price::new(dec("-0.01")),
            Err(PriceError::Negative(dec("-0.01")))
        );
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_times_and_sum() {
        let latte = Price::whole(50);
        let cake = Price::new(dec("65.50")).unwrap();
        let total: Price = [latte.times(2), cake.times(3)].into_iter().sum();
        assert_eq!(total.amount(), dec("296.50"));
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(Price::ZERO.format_currency(), "฿0.00");
        assert_eq!(Price::whole(100).format_currency(), "฿100.00");
        assert_eq!(Price::whole(1_234_567).format_currency(), "฿1,234,567.00");
        assert_eq!(
            Price::new(dec("1999.995")).unwrap().format_currency(),
            "฿2,000.00"
        );
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let huge = Price::new(Decimal::MAX / Decimal::TWO).unwrap();

        assert_eq!(huge.times(3), Price::MAX);
        assert_eq!(huge + huge + huge, Price::MAX);
        assert_eq!(huge.checked_add(huge.times(2)), None);
        assert_eq!(Price::whole(1).checked_add(Price::whole(2)), Some(Price::whole(3)));

        let total: Price = [huge, huge, huge].into_iter().sum();
        assert_eq!(total, Price::MAX);
    }

    #[test]
    fn test_format_rounds_half_away_from_zero() {
        assert_eq!(Price::new(dec("0.125")).unwrap().format_currency(), "฿0.13");
        assert_eq!(Price::new(dec("2.345")).unwrap().format_currency(), "฿2.35");
        assert_eq!(Price::new(dec("0.0005")).unwrap().format_plain(), "0.001");
    }

    #[test]
    fn test_format_plain() {
        assert_eq!(Price::whole(100).to_string(), "100");
        assert_eq!(Price::whole(1000).to_string(), "1,000");
        assert_eq!(Price::new(dec("1234.50")).unwrap().to_string(), "1,234.5");
        assert_eq!(Price::ZERO.to_string(), "0");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Price = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(ok.amount(), dec("12.5"));
        assert!(serde_json::from_str::<Price>("\"-1\"").is_err());
    }
}
