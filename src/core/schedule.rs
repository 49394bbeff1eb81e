use std::fmt::{Display, Formatter};

use chrono::NaiveTime;
use comfy_table::Color;
use itertools::Itertools;

use crate::core::time_range::{Period, TimeRange};

/// Number of slots in a day.
pub const N_SLOTS: i32 = 48;

/// Starts of the fixed daily slots: `00:00`, `00:30`, …, `23:30`.
pub fn slots() -> impl Iterator<Item = NaiveTime> {
    (0..N_SLOTS).map(|index| NaiveTime::MIN + TimeRange::HALF_HOUR * index)
}

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum ScheduleState {
    /// Electricity is cheap: pre-heat.
    High,

    /// Set-back temperature.
    Low,
}

impl Display for ScheduleState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Low => write!(f, "Low"),
        }
    }
}

impl ScheduleState {
    /// Desired state of the slot starting at the specified time.
    pub fn at(slot: NaiveTime, periods: &[Period]) -> Self {
        if periods.iter().any(|period| period.contains(slot)) { Self::High } else { Self::Low }
    }

    pub const fn color(self) -> Color {
        match self {
            Self::High => Color::Red,
            Self::Low => Color::Blue,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
#[must_use]
pub struct ScheduleEvent {
    pub time: NaiveTime,
    pub target_state: ScheduleState,
}

/// State changes within a day, starting at midnight.
#[must_use]
#[derive(Clone, Debug, Default, Eq, PartialEq, derive_more::IntoIterator)]
pub struct Schedule(#[into_iterator(owned, ref)] Vec<ScheduleEvent>);

impl Schedule {
    #[must_use]
    pub fn events(&self) -> &[ScheduleEvent] {
        &self.0
    }

    /// Last event at or before the specified time of day.
    #[must_use]
    pub fn effective_at(&self, time: NaiveTime) -> Option<ScheduleEvent> {
        self.0.iter().take_while(|event| event.time <= time).last().copied()
    }
}

/// Walk the daily slots and emit an event at midnight and at every state change.
pub fn build_schedule(periods: &[Period]) -> Schedule {
    let events = slots()
        .map(|slot| (slot, ScheduleState::at(slot, periods)))
        .dedup_by(|(_, lhs), (_, rhs)| lhs == rhs)
        .map(|(time, target_state)| ScheduleEvent { time, target_state })
        .collect_vec();
    Schedule(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn event(hour: u32, minute: u32, target_state: ScheduleState) -> ScheduleEvent {
        ScheduleEvent { time: time(hour, minute), target_state }
    }

    #[test]
    fn test_slots() {
        let slots = slots().collect_vec();
        assert_eq!(slots.len(), 48);
        assert_eq!(slots[0], NaiveTime::MIN);
        assert_eq!(slots[1], time(0, 30));
        assert_eq!(slots[47], time(23, 30));
    }

    #[test]
    fn test_build_schedule() {
        let periods =
            [TimeRange::new(time(6, 0), time(7, 0)), TimeRange::new(time(12, 0), time(12, 30))];
        assert_eq!(
            build_schedule(&periods).events(),
            &[
                event(0, 0, ScheduleState::Low),
                event(6, 0, ScheduleState::High),
                event(7, 0, ScheduleState::Low),
                event(12, 0, ScheduleState::High),
                event(12, 30, ScheduleState::Low),
            ],
        );
    }

    #[test]
    fn test_build_schedule_without_periods() {
        assert_eq!(build_schedule(&[]).events(), &[event(0, 0, ScheduleState::Low)]);
    }

    #[test]
    fn test_build_schedule_cheap_midnight() {
        let periods = [Period::half_hour_from(time(0, 0)), Period::half_hour_from(time(23, 30))];
        assert_eq!(
            build_schedule(&periods).events(),
            &[
                event(0, 0, ScheduleState::High),
                event(0, 30, ScheduleState::Low),
                event(23, 30, ScheduleState::High),
            ],
        );
    }

    #[test]
    fn test_adjacent_periods_are_merged() {
        let periods = [
            Period::half_hour_from(time(9, 0)),
            Period::half_hour_from(time(9, 30)),
            Period::half_hour_from(time(10, 0)),
        ];
        assert_eq!(
            build_schedule(&periods).events(),
            &[
                event(0, 0, ScheduleState::Low),
                event(9, 0, ScheduleState::High),
                event(10, 30, ScheduleState::Low),
            ],
        );
    }

    #[test]
    fn test_overlapping_periods_are_tolerated() {
        let periods =
            [TimeRange::new(time(8, 0), time(10, 0)), TimeRange::new(time(9, 0), time(9, 30))];
        assert_eq!(
            build_schedule(&periods).events(),
            &[
                event(0, 0, ScheduleState::Low),
                event(8, 0, ScheduleState::High),
                event(10, 0, ScheduleState::Low),
            ],
        );
    }

    #[test]
    fn test_consecutive_events_differ() {
        let periods = (0..48)
            .filter(|index| index % 3 != 0)
            .map(|index| Period::half_hour_from(NaiveTime::MIN + TimeRange::HALF_HOUR * index))
            .collect_vec();
        let schedule = build_schedule(&periods);
        assert_eq!(schedule.events()[0].time, NaiveTime::MIN);
        for (lhs, rhs) in schedule.events().iter().tuple_windows() {
            assert_ne!(lhs.target_state, rhs.target_state);
            assert!(lhs.time < rhs.time);
        }
    }

    #[test]
    fn test_effective_at() {
        let schedule = build_schedule(&[TimeRange::new(time(6, 0), time(7, 0))]);
        assert_eq!(schedule.effective_at(time(0, 0)), Some(event(0, 0, ScheduleState::Low)));
        assert_eq!(schedule.effective_at(time(5, 59)), Some(event(0, 0, ScheduleState::Low)));
        assert_eq!(schedule.effective_at(time(6, 0)), Some(event(6, 0, ScheduleState::High)));
        assert_eq!(schedule.effective_at(time(23, 59)), Some(event(7, 0, ScheduleState::Low)));
        assert_eq!(Schedule::default().effective_at(time(12, 0)), None);
    }
}
