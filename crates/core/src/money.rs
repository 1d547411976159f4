//! Monetary amounts in minor currency units.

use core::iter::Sum;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Non-negative amount in the smallest currency unit (e.g. cents).
///
/// Integer arithmetic keeps line and cart totals exact: `9.99 * 3` is
/// `2997` minor units, never `29.969999...`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    pub const fn minor(self) -> u64 {
        self.0
    }

    /// `self * quantity`, rejecting negative quantities and overflow.
    pub fn checked_times(self, quantity: i64) -> DomainResult<Money> {
        let qty = u64::try_from(quantity)
            .map_err(|_| DomainError::InvalidQuantity { requested: quantity })?;
        self.0
            .checked_mul(qty)
            .map(Money)
            .ok_or_else(|| DomainError::invariant("amount overflow"))
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
