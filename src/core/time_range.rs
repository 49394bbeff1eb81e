use std::{
    fmt::{Debug, Display, Formatter},
    str::FromStr,
};

use chrono::{NaiveTime, TimeDelta};

use crate::prelude::*;

/// Cheap half-hour derived from a single price record.
pub type Period = TimeRange;

/// Half-open time-of-day range.
///
/// An end at or before the start wraps over midnight, so `23:30 - 00:00`
/// covers the last half-hour of the day.
#[derive(Copy, Clone, Eq, Hash, PartialEq)]
#[must_use]
pub struct TimeRange {
    /// Inclusive.
    pub start: NaiveTime,

    /// Exclusive.
    pub end: NaiveTime,
}

impl Debug for TimeRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.start.format(Self::FORMAT), self.end.format(Self::FORMAT))
    }
}

impl FromStr for TimeRange {
    type Err = Error;

    /// Parse the `HH:MM - HH:MM` form.
    fn from_str(s: &str) -> Result<Self> {
        let (start, end) =
            s.split_once(" - ").with_context(|| format!("`{s}` is not separated by ` - `"))?;
        let start = NaiveTime::parse_from_str(start.trim(), Self::FORMAT)
            .with_context(|| format!("invalid start time `{start}`"))?;
        let end = NaiveTime::parse_from_str(end.trim(), Self::FORMAT)
            .with_context(|| format!("invalid end time `{end}`"))?;
        ensure!(start != end, "`{s}` is empty");
        Ok(Self::new(start, end))
    }
}

impl TimeRange {
    pub const FORMAT: &'static str = "%H:%M";

    pub const HALF_HOUR: TimeDelta = TimeDelta::minutes(30);

    pub const fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn half_hour_from(start: NaiveTime) -> Self {
        let (end, _) = start.overflowing_add_signed(Self::HALF_HOUR);
        Self { start, end }
    }

    #[must_use]
    pub fn contains(self, time: NaiveTime) -> bool {
        if self.start < self.end {
            (self.start <= time) && (time < self.end)
        } else {
            (self.start <= time) || (time < self.end)
        }
    }
}
