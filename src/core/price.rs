use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::quantity::rate::KilowattHourRate;

/// Half-hourly unit rate as published by the tariff feed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[must_use]
pub struct PriceRecord {
    pub valid_from: DateTime<Utc>,
    pub value_inc_vat: KilowattHourRate,
}

impl PriceRecord {
    /// Local time of day the record starts at.
    #[must_use]
    pub fn local_time(&self, time_zone: Tz) -> NaiveTime {
        self.valid_from.with_timezone(&time_zone).time()
    }
}
