use crate::error::ComandaError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

/// A monetary value held as an integer number of cents.
///
/// Amounts enter and leave the system as decimals with at most two
/// fractional digits. All arithmetic happens on the integer so totals
/// never drift, and "fully paid" is an exact comparison against zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);
    /// Largest single amount accepted from the outside: 100,000,000.00.
    /// Totals built from bounded amounts and quantities stay far inside `i64`.
    pub const MAX: Self = Self(10_000_000_000);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Converts a decimal amount, rejecting sub-cent precision.
    pub fn from_decimal(value: Decimal) -> Result<Self, ComandaError> {
        if value.round_dp(2) != value {
            return Err(ComandaError::Validation(format!(
                "Amount {value} has more than two decimal places"
            )));
        }
        let out_of_range = || ComandaError::Validation(format!("Amount {value} is out of range"));
        let cents = value
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .ok_or_else(out_of_range)?;
        if cents.abs() > Self::MAX.0 {
            return Err(out_of_range());
        }
        Ok(Self(cents))
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_mul(self, rhs: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(rhs)).map(Self)
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl TryFrom<Decimal> for Money {
    type Error = ComandaError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::from_decimal(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.to_decimal()
    }
}

impl FromStr for Money {
    type Err = ComandaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| ComandaError::Validation(format!("Invalid amount '{s}': {e}")))?;
        Self::from_decimal(value)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<u32> for Money {
    type Output = Self;
    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0 * i64::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

/// A strictly positive amount, used for declared payment fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Money", into = "Money")]
pub struct Amount(Money);

impl Amount {
    pub fn new(value: Money) -> Result<Self, ComandaError> {
        if value.is_positive() {
            Ok(Self(value))
        } else {
            Err(ComandaError::Validation(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Money {
        self.0
    }
}

impl TryFrom<Money> for Amount {
    type Error = ComandaError;

    fn try_from(value: Money) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Money {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_cents(2500);
        let b = Money::from_cents(800);
        assert_eq!(a * 2 + b, Money::from_cents(5800));
        assert_eq!(a - b, Money::from_cents(1700));
        assert_eq!(
            vec![a, b, b].into_iter().sum::<Money>(),
            Money::from_cents(4100)
        );
    }

    #[test]
    fn test_money_from_decimal() {
        assert_eq!(Money::from_decimal(dec!(58.00)).unwrap(), Money::from_cents(5800));
        assert_eq!(Money::from_decimal(dec!(0.1)).unwrap(), Money::from_cents(10));
        assert!(matches!(
            Money::from_decimal(dec!(1.005)),
            Err(ComandaError::Validation(_))
        ));
    }

    #[test]
    fn test_money_ceiling() {
        assert_eq!(
            Money::from_decimal(dec!(100000000.00)).unwrap(),
            Money::MAX
        );
        assert!(matches!(
            Money::from_decimal(dec!(100000000.01)),
            Err(ComandaError::Validation(_))
        ));
        assert!(matches!(
            "90000000000000000.00".parse::<Money>(),
            Err(ComandaError::Validation(_))
        ));
        assert!(Money::from_decimal(dec!(-100000000.01)).is_err());
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(
            Money::MAX.checked_mul(2),
            Some(Money::from_cents(20_000_000_000))
        );
        assert_eq!(Money::from_cents(i64::MAX).checked_mul(2), None);
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    }

    #[test]
    fn test_money_display_and_parse() {
        assert_eq!(Money::from_cents(2800).to_string(), "28.00");
        assert_eq!(Money::from_cents(-150).to_string(), "-1.50");
        assert_eq!("25.00".parse::<Money>().unwrap(), Money::from_cents(2500));
        assert_eq!(" 8 ".parse::<Money>().unwrap(), Money::from_cents(800));
        assert!("abc".parse::<Money>().is_err());
    }

    #[test]
    fn test_tenths_do_not_drift() {
        let total: Money = (0..10).map(|_| Money::from_cents(10)).sum();
        assert_eq!(total, Money::from_cents(100));
        assert_eq!(total - Money::from_cents(100), Money::ZERO);
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(Money::from_cents(1)).is_ok());
        assert!(matches!(
            Amount::new(Money::ZERO),
            Err(ComandaError::Validation(_))
        ));
        assert!(matches!(
            Amount::new(Money::from_cents(-100)),
            Err(ComandaError::Validation(_))
        ));
    }

    #[test]
    fn test_money_serializes_as_decimal() {
        let json = serde_json::to_string(&Money::from_cents(5800)).unwrap();
        assert_eq!(json, "\"58.00\"");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Money::from_cents(5800));
    }
}
