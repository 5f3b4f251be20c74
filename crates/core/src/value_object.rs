//! Value object trait: equality by value, not identity.

use core::iter::Sum;
use core::ops::Add;

use serde::{Deserialize, Serialize};

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// A decimal monetary amount without currency minor units (e.g. `19.99`).
///
/// The catalog is the authority on prices; an `Amount` carries whatever it
/// was given. Sums are always recomputed from line values in a fixed order,
/// so two recomputations over the same lines are bit-identical.
#[derive(Debug, Copy, Clone, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(f64);

impl Amount {
    pub const ZERO: Amount = Amount(0.0);

    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * f64::from(quantity))
    }
}

impl ValueObject for Amount {}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn times_scales_unit_price() {
        assert_eq!(Amount::new(12.5).times(4), Amount::new(50.0));
        assert_eq!(Amount::new(99.0).times(0), Amount::ZERO);
    }

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!(Amount::new(100.0).to_string(), "100.00");
        assert_eq!(Amount::new(0.5).to_string(), "0.50");
    }

    proptest! {
        /// Property: summing in the same order is reproducible.
        #[test]
        fn sum_is_reproducible(values in prop::collection::vec(0.0f64..10_000.0, 0..32)) {
            let a: Amount = values.iter().copied().map(Amount::new).sum();
            let b: Amount = values.iter().copied().map(Amount::new).sum();
            prop_assert_eq!(a, b);
        }
    }
}
