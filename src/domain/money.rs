use crate::error::CheckoutError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount in the smallest denomination of the store currency (paise for INR).
///
/// Gateways only accept integer amounts, so every charge crosses the wire as
/// `MinorUnits`. Prices inside the store stay as `Decimal` major units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(u64);

impl MinorUnits {
    pub const ZERO: Self = Self(0);

    const PER_MAJOR: Decimal = Decimal::ONE_HUNDRED;

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Converts a major-unit total (e.g. rupees) into minor units.
    pub fn from_major(total: Decimal) -> Result<Self, CheckoutError> {
        if total < Decimal::ZERO {
            return Err(CheckoutError::ValidationError(
                "Amount must not be negative".to_string(),
            ));
        }

        let out_of_range = || CheckoutError::ValidationError("Amount out of range".to_string());
        total
            .checked_mul(Self::PER_MAJOR)
            .ok_or_else(out_of_range)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .map(Self)
            .ok_or_else(out_of_range)
    }

    pub fn to_major(&self) -> Decimal {
        Decimal::from(self.0) / Self::PER_MAJOR
    }
}

impl TryFrom<Decimal> for MinorUnits {
    type Error = CheckoutError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::from_major(value)
    }
}

impl From<MinorUnits> for u64 {
    fn from(amount: MinorUnits) -> Self {
        amount.0
    }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_major())
    }
}
