use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;

/// A signed amount kept at two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Rounds to cents. A value that rounds to zero is stored as positive zero
    /// so it never renders as `-0.00`.
    pub fn from_decimal(decimal: Decimal) -> Self {
        let rounded = decimal.round_dp(2);
        if rounded.is_zero() {
            Money::zero()
        } else {
            Money(rounded)
        }
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_positive(self) -> bool {
        self.0.cmp(&Decimal::ZERO) == Ordering::Greater
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self {
        Money::from_decimal(-self.0)
    }
}

/// Always a literal `.` with exactly two fractional digits, e.g. `-1500.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
