//! Money type with exact decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! `Money` wraps `rust_decimal::Decimal`, which is a base-10 fixed-point
//! number, so `100.005 != 100.00` holds exactly. On the wire it is always a
//! decimal string; a JSON number is rejected.
//!
//! There is no `+`/`-`/`Sum`: `Decimal` rounds a result that does not fit in
//! 28 significant digits, so all arithmetic goes through the checked methods,
//! which refuse both overflow and rounding.

use std::ops::Neg;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A signed monetary amount in the book's single currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(#[serde(with = "rust_decimal::serde::str")] Decimal);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wraps a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Builds an amount from an integer count of minor units (e.g. cents).
    #[must_use]
    pub fn from_minor_units(units: i64, scale: u32) -> Self {
        Self(Decimal::new(units, scale))
    }

    /// Returns the underlying decimal.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns true if the amount is strictly less than zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Adds two amounts, returning `None` if the exact sum is not representable.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        let sum = self.0.checked_add(other.0)?;
        exact(sum, self.0, other.0).then_some(Self(sum))
    }

    /// Subtracts two amounts, returning `None` if the exact difference is not
    /// representable.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        let difference = self.0.checked_sub(other.0)?;
        exact(difference, self.0, -other.0).then_some(Self(difference))
    }

    /// Sums amounts, returning `None` as soon as a partial sum is not representable.
    pub fn checked_sum<I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, Self::checked_add)
    }
}

/// Whether `result` is exactly `a + b`.
///
/// Decimal addition keeps the larger operand scale unless it had to round. A
/// dropped scale is still exact when only zero digits were discarded.
fn exact(result: Decimal, a: Decimal, b: Decimal) -> bool {
    result.scale() >= a.scale().max(b.scale())
        || (result.checked_sub(a) == Some(b) && result.checked_sub(b) == Some(a))
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<i64> for Money {
    fn from(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }
}

impl From<i32> for Money {
    fn from(amount: i32) -> Self {
        Self(Decimal::from(amount))
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str_exact(s.trim()).map(Self)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}
