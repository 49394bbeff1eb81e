use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::core::schedule::{Schedule, ScheduleEvent};

/// Decides when to recompute the schedule and when to switch the thermostats.
///
/// The ticker does not know the wall clock: the caller feeds it the local time,
/// which keeps the daily cycle testable without sleeping.
#[must_use]
pub struct Ticker {
    recompute_at: NaiveTime,
    schedule: Schedule,

    /// Date of the last recomputation attempt, successful or not.
    recomputed_on: Option<NaiveDate>,

    /// Date and time of the last dispatched event.
    dispatched: Option<(NaiveDate, NaiveTime)>,
}

impl Ticker {
    pub const fn new(recompute_at: NaiveTime, schedule: Schedule) -> Self {
        Self { recompute_at, schedule, recomputed_on: None, dispatched: None }
    }

    pub const fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Return the date to recompute the schedule for, if the recomputation is due.
    ///
    /// It is due on the very first call, and then once per day at or after the recomputation time.
    pub fn poll_recompute(&mut self, now: NaiveDateTime) -> Option<NaiveDate> {
        let today = now.date();
        let is_due = match self.recomputed_on {
            None => true,
            Some(recomputed_on) => (recomputed_on < today) && (now.time() >= self.recompute_at),
        };
        if is_due {
            self.recomputed_on = Some(today);
            Some(today)
        } else {
            None
        }
    }

    /// Replace the schedule after a successful recomputation.
    ///
    /// The currently effective state gets dispatched again on the next poll.
    pub fn replace(&mut self, schedule: Schedule) {
        self.schedule = schedule;
        self.dispatched = None;
    }

    /// Return the event to dispatch, if the effective event has changed since the last call.
    pub fn poll_dispatch(&mut self, now: NaiveDateTime) -> Option<ScheduleEvent> {
        let event = self.schedule.effective_at(now.time())?;
        let key = (now.date(), event.time);
        if self.dispatched == Some(key) {
            None
        } else {
            self.dispatched = Some(key);
            Some(event)
        }
    }
}
