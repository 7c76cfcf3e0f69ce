//! Fixed-point decimal codec.
//!
//! Monetary amounts and KPI values are held as a whole number of
//! `10^-SCALE` units and stored as that INTEGER, so no binary float is ever
//! involved and SQL comparison and ordering agree with numeric order. Values
//! are rounded half away from zero when they are built (`12.345` becomes
//! `12.35`); reading a stored value back never rounds again.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use super::{FieldCodec, SqlType, StoredValue, expect_integer};
use crate::error::DecodeError;

/// A decimal with exactly `SCALE` fractional digits.
///
/// The representable range is that of `i64` units, about ±9.2e16 for a
/// scale of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fixed<const SCALE: u32>(i64);

/// Two fractional digits: currency amounts and KPI progress values.
pub type Decimal2 = Fixed<2>;

impl<const SCALE: u32> Fixed<SCALE> {
    /// Rounds `value` to `SCALE` fractional digits.
    ///
    /// Fails when the rounded value does not fit the unit range.
    pub fn new(value: Decimal) -> Result<Self, rust_decimal::Error> {
        let mut rounded = value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(SCALE);

        let out_of_range = if value.is_sign_negative() {
            rust_decimal::Error::LessThanMinimumPossibleValue
        } else {
            rust_decimal::Error::ExceedsMaximumPossibleValue
        };
        if rounded.scale() != SCALE {
            return Err(out_of_range);
        }
        i64::try_from(rounded.mantissa())
            .map(Self)
            .map_err(|_| out_of_range)
    }

    /// Parses and rounds a decimal literal.
    pub fn parse(text: &str) -> Result<Self, rust_decimal::Error> {
        Decimal::from_str(text.trim()).and_then(Self::new)
    }

    /// Builds a value from its stored unit count.
    pub fn from_units(units: i64) -> Self {
        Self(units)
    }

    /// The value as a whole number of `10^-SCALE` units.
    pub fn units(&self) -> i64 {
        self.0
    }

    /// Returns the value as a decimal with exactly `SCALE` digits.
    pub fn value(&self) -> Decimal {
        const { assert!(SCALE <= 28, "rust_decimal supports at most 28 fractional digits") };
        Decimal::new(self.0, SCALE)
    }

    /// Adds `rhs`, or `None` on overflow.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

impl<const SCALE: u32> TryFrom<Decimal> for Fixed<SCALE> {
    type Error = rust_decimal::Error;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<const SCALE: u32> Add for Fixed<SCALE> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl<const SCALE: u32> Sum for Fixed<SCALE> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, v| acc + v)
    }
}

impl<const SCALE: u32> fmt::Display for Fixed<SCALE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Stored as the INTEGER unit count. Text or REAL in the column is a type
/// mismatch, not something to reinterpret.
impl<const SCALE: u32> FieldCodec for Fixed<SCALE> {
    const SQL_TYPE: SqlType = SqlType::Integer;

    fn encode(&self) -> StoredValue {
        StoredValue::Integer(self.0)
    }

    fn decode(column: &str, value: &StoredValue) -> Result<Self, DecodeError> {
        expect_integer(column, value).map(Self::from_units)
    }
}
