use chrono::Utc;
use clap::Parser;

use crate::{
    cli::{DerivationArgs, DispatchArgs, OctopusArgs, PeriodsFileArgs},
    planner::Planner,
    prelude::*,
    tables::{build_prices_table, build_schedule_table},
};

#[derive(Parser)]
pub struct HuntArgs {
    #[clap(flatten)]
    pub octopus: OctopusArgs,

    #[clap(flatten)]
    pub derivation: DerivationArgs,

    #[clap(flatten)]
    pub dispatch: DispatchArgs,

    #[clap(flatten)]
    pub periods_file: PeriodsFileArgs,
}

impl HuntArgs {
    #[instrument(skip_all)]
    pub async fn run(self) -> Result {
        let dispatcher = self.dispatch.new_dispatcher()?;
        let planner = Planner::builder()
            .feed(self.octopus.new_client()?)
            .deriver(self.derivation.deriver())
            .periods_path(self.periods_file.path)
            .build();

        let now = Utc::now().with_timezone(&self.derivation.time_zone);
        let plan = planner.plan(now.date_naive()).await?;
        println!(
            "{}",
            build_prices_table(&plan.records, &planner.deriver, plan.derivation.threshold)
        );
        println!("{}", build_schedule_table(&plan.schedule, self.dispatch.temperatures.into()));

        let event = plan
            .schedule
            .effective_at(now.time())
            .context("the schedule has no event before the current time")?;
        info!(time = %event.time, state = %event.target_state, "effective now");
        dispatcher.dispatch(event.target_state).await;
        Ok(())
    }
}
