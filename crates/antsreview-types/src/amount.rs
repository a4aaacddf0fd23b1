//! Token amounts in the smallest unit
//!
//! All escrow accounting is integer arithmetic on `u64`. Every operation
//! that could wrap is checked.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount of the review token, in its smallest unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(pub u64);

impl Amount {
    pub fn zero() -> Self {
        Self(0)
    }

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Subtraction clamped at zero
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Sum an iterator of amounts, failing on overflow
    pub fn checked_sum<I: IntoIterator<Item = Amount>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Amount::zero(), |acc, a| acc.checked_add(a))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(Amount::new(100).checked_sub(Amount::new(60)), Some(Amount::new(40)));
        assert_eq!(Amount::new(10).checked_sub(Amount::new(11)), None);
        assert_eq!(Amount::new(u64::MAX).checked_add(Amount::new(1)), None);
        assert_eq!(Amount::new(10).saturating_sub(Amount::new(11)), Amount::zero());
    }

    #[test]
    fn test_checked_sum() {
        let total = Amount::checked_sum(vec![Amount::new(1), Amount::new(2), Amount::new(3)]);
        assert_eq!(total, Some(Amount::new(6)));
        assert_eq!(Amount::checked_sum(vec![Amount::new(u64::MAX), Amount::new(1)]), None);
        assert_eq!(Amount::checked_sum(Vec::new()), Some(Amount::zero()));
    }
}
