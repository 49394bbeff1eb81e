use async_trait::async_trait;
use bon::Builder;

use crate::{core::schedule::ScheduleState, prelude::*, quantity::temperature::Celsius};

#[async_trait]
pub trait Thermostat: Send + Sync {
    /// Set the target temperature of all the controlled zones.
    async fn set_temperature(&self, temperature: Celsius) -> Result;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Temperatures {
    pub high: Celsius,
    pub low: Celsius,
}

impl Temperatures {
    pub const fn get(self, state: ScheduleState) -> Celsius {
        match state {
            ScheduleState::High => self.high,
            ScheduleState::Low => self.low,
        }
    }
}

/// Translates the schedule states into thermostat commands.
#[derive(Builder)]
pub struct Dispatcher<T> {
    thermostat: T,
    temperatures: Temperatures,

    /// Only log the commands without sending them.
    #[builder(default)]
    scout: bool,
}

impl<T: Thermostat> Dispatcher<T> {
    /// Send the command, returns whether it was acknowledged.
    ///
    /// Failures are only logged: the next boundary or recomputation sends a fresh command anyway.
    #[instrument(skip_all, fields(state = %state))]
    pub async fn dispatch(&self, state: ScheduleState) -> bool {
        let temperature = self.temperatures.get(state);
        if self.scout {
            info!(%temperature, "scouting, not sending the command");
            return false;
        }
        match self.thermostat.set_temperature(temperature).await {
            Ok(()) => {
                info!(%temperature, "switched");
                true
            }
            Err(error) => {
                warn!(%temperature, "failed to set the temperature: {error:#}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use ordered_float::OrderedFloat;

    use super::*;

    const TEMPERATURES: Temperatures =
        Temperatures { high: Celsius(OrderedFloat(21.0)), low: Celsius(OrderedFloat(16.0)) };

    #[derive(Default)]
    struct RecordingThermostat {
        commands: Mutex<Vec<Celsius>>,
        is_broken: bool,
    }

    #[async_trait]
    impl Thermostat for RecordingThermostat {
        async fn set_temperature(&self, temperature: Celsius) -> Result {
            ensure!(!self.is_broken, "connection refused");
            self.commands.lock().unwrap().push(temperature);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dispatch_ok() {
        let dispatcher = Dispatcher::builder()
            .thermostat(RecordingThermostat::default())
            .temperatures(TEMPERATURES)
            .build();
        assert!(dispatcher.dispatch(ScheduleState::High).await);
        assert!(dispatcher.dispatch(ScheduleState::Low).await);
        assert_eq!(
            *dispatcher.thermostat.commands.lock().unwrap(),
            [Celsius::from(21.0), Celsius::from(16.0)],
        );
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_not_fatal() {
        let dispatcher = Dispatcher::builder()
            .thermostat(RecordingThermostat { is_broken: true, ..Default::default() })
            .temperatures(TEMPERATURES)
            .build();
        assert!(!dispatcher.dispatch(ScheduleState::High).await);
    }

    #[tokio::test]
    async fn test_scout() {
        let dispatcher = Dispatcher::builder()
            .thermostat(RecordingThermostat::default())
            .temperatures(TEMPERATURES)
            .scout(true)
            .build();
        assert!(!dispatcher.dispatch(ScheduleState::High).await);
        assert!(dispatcher.thermostat.commands.lock().unwrap().is_empty());
    }
}
