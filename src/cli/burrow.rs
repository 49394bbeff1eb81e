use chrono::Utc;
use clap::{Parser, Subcommand};

use crate::{
    cli::{DerivationArgs, HomeAssistantArgs, OctopusArgs, PeriodsFileArgs, TemperatureArgs},
    core::{aggregate::Aggregate, schedule::build_schedule},
    dispatch::Thermostat,
    periods::read_periods,
    planner::PriceFeed,
    prelude::*,
    quantity::temperature::Celsius,
    tables::{build_prices_table, build_schedule_table},
};

#[derive(Parser)]
pub struct BurrowArgs {
    #[command(subcommand)]
    command: BurrowCommand,
}

#[derive(Subcommand)]
enum BurrowCommand {
    /// Fetch and show today's prices along with the cheap ones.
    Prices {
        #[clap(flatten)]
        octopus: OctopusArgs,

        #[clap(flatten)]
        derivation: DerivationArgs,
    },

    /// Show the schedule built from the saved periods.
    Periods {
        #[clap(flatten)]
        periods_file: PeriodsFileArgs,

        #[clap(flatten)]
        temperatures: TemperatureArgs,
    },

    /// Set the thermostats to the given temperature right away.
    SetTemperature {
        #[clap(flatten)]
        home_assistant: HomeAssistantArgs,

        /// Target temperature, °C.
        temperature: Celsius,
    },
}

impl BurrowArgs {
    pub async fn run(self) -> Result {
        match self.command {
            BurrowCommand::Prices { octopus, derivation } => {
                let deriver = derivation.deriver();
                let today = Utc::now().with_timezone(&derivation.time_zone).date_naive();
                let records = octopus.new_client()?.get_rates(today, derivation.time_zone).await?;
                let median = records.iter().map(|record| record.value_inc_vat).median();
                info!(len = records.len(), median = ?median, "fetched");
                let derivation = deriver.derive(&records)?;
                info!(threshold = %derivation.threshold, n_periods = derivation.periods.len());
                println!("{}", build_prices_table(&records, &deriver, derivation.threshold));
            }

            BurrowCommand::Periods { periods_file, temperatures } => {
                let periods = read_periods(&periods_file.path)?;
                let schedule = build_schedule(&periods);
                println!("{}", build_schedule_table(&schedule, temperatures.into()));
            }

            BurrowCommand::SetTemperature { home_assistant, temperature } => {
                home_assistant.new_client()?.set_temperature(temperature).await?;
                info!(%temperature, "done");
            }
        }
        Ok(())
    }
}
