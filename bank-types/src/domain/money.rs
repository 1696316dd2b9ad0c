//! Fixed-precision monetary value.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Non-negative money amount.
///
/// Amount is stored in minor units (kopecks, two decimal places)
/// to avoid floating-point precision issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Money(i64);

impl Money {
    /// Creates a new Money value from minor units.
    pub fn new(amount: i64) -> Result<Self, DomainError> {
        if amount < 0 {
            return Err(DomainError::NegativeAmount);
        }
        Ok(Self(amount))
    }

    /// Creates a strictly positive amount, as required for value movement.
    pub fn positive(amount: i64) -> Result<Self, DomainError> {
        if amount <= 0 {
            return Err(DomainError::InvalidAmount);
        }
        Ok(Self(amount))
    }

    pub fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in minor units.
    pub fn amount(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition - fails instead of wrapping on overflow.
    pub fn checked_add(&self, other: Money) -> Result<Money, DomainError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| DomainError::ValidationError("Balance overflow".into()))
    }

    /// Checked subtraction - returns error if the result would be negative.
    pub fn checked_sub(&self, other: Money) -> Result<Money, DomainError> {
        if self.0 < other.0 {
            return Err(DomainError::InsufficientFunds {
                available: self.0,
                requested: other.0,
            });
        }
        Ok(Money(self.0 - other.0))
    }
}

impl TryFrom<i64> for Money {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_money_fails() {
        assert!(matches!(Money::new(-100), Err(DomainError::NegativeAmount)));
    }

    #[test]
    fn test_positive_rejects_zero() {
        assert!(matches!(Money::positive(0), Err(DomainError::InvalidAmount)));
        assert!(matches!(Money::positive(-5), Err(DomainError::InvalidAmount)));
        assert_eq!(Money::positive(5).unwrap().amount(), 5);
    }

    #[test]
    fn test_money_subtraction() {
        let a = Money::new(10_000).unwrap();
        let b = Money::new(3_000).unwrap();
        assert_eq!(a.checked_sub(b).unwrap().amount(), 7_000);
        assert!(matches!(
            b.checked_sub(a),
            Err(DomainError::InsufficientFunds {
                available: 3_000,
                requested: 10_000
            })
        ));
    }

    #[test]
    fn test_money_overflow_fails() {
        let max = Money::new(i64::MAX).unwrap();
        assert!(max.checked_add(Money::new(1).unwrap()).is_err());
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(10_000).unwrap().to_string(), "100.00");
        assert_eq!(Money::new(1_050).unwrap().to_string(), "10.50");
        assert_eq!(Money::new(7).unwrap().to_string(), "0.07");
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        let parsed: Result<Money, _> = serde_json::from_str("-1");
        assert!(parsed.is_err());
    }
}
