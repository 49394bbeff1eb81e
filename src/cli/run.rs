use std::time::Duration;

use bon::Builder;
use chrono::{NaiveTime, Utc};
use chrono_tz::Tz;
use clap::Parser;
use tokio::time::{MissedTickBehavior, interval};

use crate::{
    api::{home_assistant, octopus},
    cli::{DerivationArgs, DispatchArgs, OctopusArgs, PeriodsFileArgs, parse_time_of_day},
    core::{
        schedule::{Schedule, build_schedule},
        ticker::Ticker,
    },
    dispatch::{Dispatcher, Temperatures},
    periods::read_periods,
    planner::Planner,
    prelude::*,
    tables::build_schedule_table,
};

#[derive(Parser)]
pub struct RunArgs {
    /// Local time to fetch the new prices and recompute the schedule at.
    #[clap(
        long = "recompute-at",
        default_value = "00:01",
        env = "RECOMPUTE_AT",
        value_parser = parse_time_of_day
    )]
    recompute_at: NaiveTime,

    #[clap(long = "polling-interval", default_value = "1s", env = "POLLING_INTERVAL")]
    polling_interval: humantime::Duration,

    #[clap(flatten)]
    octopus: OctopusArgs,

    #[clap(flatten)]
    derivation: DerivationArgs,

    #[clap(flatten)]
    dispatch: DispatchArgs,

    #[clap(flatten)]
    periods_file: PeriodsFileArgs,
}

impl RunArgs {
    pub async fn run(self) -> Result {
        // Yesterday's periods keep applying if the first fetch fails:
        let schedule = match read_periods(&self.periods_file.path) {
            Ok(periods) => build_schedule(&periods),
            Err(error) => {
                warn!("failed to load the saved periods: {error:#}");
                Schedule::default()
            }
        };
        Daemon::builder()
            .ticker(Ticker::new(self.recompute_at, schedule))
            .planner(
                Planner::builder()
                    .feed(self.octopus.new_client()?)
                    .deriver(self.derivation.deriver())
                    .periods_path(self.periods_file.path)
                    .build(),
            )
            .dispatcher(self.dispatch.new_dispatcher()?)
            .temperatures(self.dispatch.temperatures.into())
            .time_zone(self.derivation.time_zone)
            .interval(self.polling_interval)
            .build()
            .run()
            .await
    }
}

#[derive(Builder)]
struct Daemon {
    ticker: Ticker,
    planner: Planner<octopus::Api>,
    dispatcher: Dispatcher<home_assistant::Api>,
    temperatures: Temperatures,
    time_zone: Tz,

    #[builder(into)]
    interval: Duration,
}

impl Daemon {
    async fn run(mut self) -> Result {
        info!(interval = ?self.interval, "running…");
        let mut interval = interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let now = Utc::now().with_timezone(&self.time_zone).naive_local();

            if let Some(on) = self.ticker.poll_recompute(now) {
                match self.planner.recompute(&mut self.ticker, on).await {
                    Ok(()) => {
                        println!(
                            "{}",
                            build_schedule_table(self.ticker.schedule(), self.temperatures)
                        );
                    }
                    Err(error) => {
                        error!("failed to recompute, keeping the previous schedule: {error:#}");
                    }
                }
            }

            if let Some(event) = self.ticker.poll_dispatch(now) {
                info!(time = %event.time, state = %event.target_state, "boundary reached");
                self.dispatcher.dispatch(event.target_state).await;
            }
        }
    }
}
