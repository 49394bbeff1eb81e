use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Pence per kilowatt-hour, VAT included.
#[derive(
    Clone,
    Copy,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Sub,
)]
#[from(f64, OrderedFloat<f64>)]
#[must_use]
pub struct KilowattHourRate(pub OrderedFloat<f64>);

impl Mul<f64> for KilowattHourRate {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Display for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} p/kWh", self.0.0)
    }
}

impl Debug for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}p", self.0.0)
    }
}
