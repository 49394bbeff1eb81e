use bon::Builder;
use chrono_tz::Tz;
use itertools::Itertools;

use crate::{
    core::{
        aggregate::Aggregate,
        price::PriceRecord,
        time_range::{Period, TimeRange},
    },
    quantity::rate::KilowattHourRate,
};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DeriveError {
    #[error("no price records within the daytime window `{0}`")]
    EmptyInput(TimeRange),

    #[error("percentile must be within 0..=100, got {0}")]
    InvalidPercentile(f64),
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Derivation {
    /// Cheap periods ordered by their start.
    pub periods: Vec<Period>,

    /// Records priced at or above the threshold are not cheap.
    pub threshold: KilowattHourRate,
}

/// Period derivation settings, fixed at start-up.
#[derive(Copy, Clone, Builder)]
pub struct Deriver {
    pub time_zone: Tz,
    pub daytime: TimeRange,
    pub percentile: f64,
}

impl Deriver {
    pub fn derive(&self, records: &[PriceRecord]) -> Result<Derivation, DeriveError> {
        derive_periods(records, self.time_zone, self.daytime, self.percentile)
    }

    #[must_use]
    pub fn is_daytime(&self, record: &PriceRecord) -> bool {
        self.daytime.contains(record.local_time(self.time_zone))
    }
}

/// Select the daytime records priced strictly below the percentile threshold.
///
/// Ties with the threshold are not cheap, hence equal prices produce no periods at all.
pub fn derive_periods(
    records: &[PriceRecord],
    time_zone: Tz,
    daytime: TimeRange,
    percentile: f64,
) -> Result<Derivation, DeriveError> {
    if !(0.0..=100.0).contains(&percentile) {
        return Err(DeriveError::InvalidPercentile(percentile));
    }
    let daytime_records = records
        .iter()
        .filter(|record| daytime.contains(record.local_time(time_zone)))
        .collect_vec();
    let threshold = daytime_records
        .iter()
        .map(|record| record.value_inc_vat)
        .percentile(percentile)
        .ok_or(DeriveError::EmptyInput(daytime))?;
    let periods = daytime_records
        .into_iter()
        .filter(|record| record.value_inc_vat < threshold)
        .sorted_by_key(|record| record.valid_from)
        .map(|record| Period::half_hour_from(record.local_time(time_zone)))
        .collect();
    Ok(Derivation { periods, threshold })
}
