use std::path::PathBuf;

use async_trait::async_trait;
use bon::Builder;
use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::{
    core::{
        deriver::{Derivation, Deriver},
        price::PriceRecord,
        schedule::{Schedule, build_schedule},
        ticker::Ticker,
    },
    periods::write_periods,
    prelude::*,
};

#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Fetch the half-hourly rates of the local date, sorted by their start.
    async fn get_rates(&self, on: NaiveDate, time_zone: Tz) -> Result<Vec<PriceRecord>>;
}

/// Daily recomputation: fetch the prices, derive the cheap periods, and build the schedule.
#[derive(Builder)]
pub struct Planner<F> {
    feed: F,
    pub deriver: Deriver,

    /// Where to save the derived periods, if anywhere.
    periods_path: Option<PathBuf>,
}

#[must_use]
pub struct Plan {
    pub records: Vec<PriceRecord>,
    pub derivation: Derivation,
    pub schedule: Schedule,
}

impl<F: PriceFeed> Planner<F> {
    #[instrument(skip_all, fields(on = %on))]
    pub async fn plan(&self, on: NaiveDate) -> Result<Plan> {
        let records = self.feed.get_rates(on, self.deriver.time_zone).await?;
        let derivation = self.deriver.derive(&records)?;
        info!(
            threshold = %derivation.threshold,
            n_periods = derivation.periods.len(),
            "derived the cheap periods"
        );
        if let Some(path) = &self.periods_path
            && let Err(error) = write_periods(path, &derivation.periods)
        {
            warn!("failed to save the periods: {error:#}");
        }
        let schedule = build_schedule(&derivation.periods);
        info!(n_events = schedule.events().len(), "built the schedule");
        Ok(Plan { records, derivation, schedule })
    }

    /// Plan the day and hand the new schedule over to the ticker.
    ///
    /// On failure the ticker keeps its previous schedule.
    pub async fn recompute(&self, ticker: &mut Ticker, on: NaiveDate) -> Result {
        let plan = self.plan(on).await?;
        ticker.replace(plan.schedule);
        Ok(())
    }
}
