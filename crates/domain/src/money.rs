//! Money value object.

use serde::{Deserialize, Serialize};

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the dollar portion (whole number).
    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * quantity as i64,
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents - rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_cents() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert_eq!(money.dollars(), 12);
        assert_eq!(money.cents_part(), 34);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "$12.34");
        assert_eq!(Money::from_cents(100).to_string(), "$1.00");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-$12.34");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply(3).cents(), 3000);
    }

    #[test]
    fn test_money_sum() {
        let total: Money = [100, 200, 300].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 600);
    }
}
