use std::fmt::{Debug, Display, Formatter};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

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
    derive_more::From,
    derive_more::FromStr,
)]
#[from(f64, OrderedFloat<f64>)]
#[must_use]
pub struct Celsius(pub OrderedFloat<f64>);

impl Display for Celsius {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} °C", self.0.0)
    }
}

impl Debug for Celsius {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}°C", self.0.0)
    }
}
