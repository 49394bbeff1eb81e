mod burrow;
mod hunt;
mod run;

use std::path::PathBuf;

use chrono::NaiveTime;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use reqwest::Url;

pub use self::{burrow::BurrowArgs, hunt::HuntArgs, run::RunArgs};
use crate::{
    api::{home_assistant, octopus},
    core::{deriver::Deriver, time_range::TimeRange},
    dispatch::{Dispatcher, Temperatures},
    prelude::*,
    quantity::temperature::Celsius,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch today's prices, derive the cheap periods, and apply the current state once.
    #[clap(name = "hunt")]
    Hunt(Box<HuntArgs>),

    /// Keep running: recompute the schedule daily and switch the thermostats at every change.
    #[clap(name = "run")]
    Run(Box<RunArgs>),

    /// Development tools.
    #[clap(name = "burrow")]
    Burrow(Box<BurrowArgs>),
}

#[derive(Parser)]
pub struct OctopusArgs {
    #[clap(
        long = "product-code",
        default_value = "AGILE-23-12-06",
        env = "OCTOPUS_PRODUCT_CODE"
    )]
    pub product_code: String,

    #[clap(
        long = "tariff-code",
        default_value = "E-1R-AGILE-23-12-06-L",
        env = "OCTOPUS_TARIFF_CODE"
    )]
    pub tariff_code: String,
}

impl OctopusArgs {
    pub fn new_client(&self) -> Result<octopus::Api> {
        octopus::Api::new(&self.product_code, &self.tariff_code)
    }
}

#[derive(Copy, Clone, Parser)]
pub struct DerivationArgs {
    /// Time zone of the daytime window and of the schedule.
    #[clap(long = "time-zone", default_value = "Europe/London", env = "TIME_ZONE")]
    pub time_zone: Tz,

    /// Half-hours priced below this percentile of the daytime prices are cheap.
    #[clap(long, default_value = "50", env = "PERCENTILE", value_parser = parse_percentile)]
    pub percentile: f64,

    /// Start of the daytime window, inclusive.
    #[clap(
        long,
        default_value = "05:00",
        env = "DAYTIME_START",
        value_parser = parse_time_of_day
    )]
    pub daytime_start: NaiveTime,

    /// End of the daytime window, exclusive.
    #[clap(
        long,
        default_value = "22:00",
        env = "DAYTIME_END",
        value_parser = parse_time_of_day
    )]
    pub daytime_end: NaiveTime,
}

impl DerivationArgs {
    pub fn deriver(self) -> Deriver {
        Deriver::builder()
            .time_zone(self.time_zone)
            .daytime(TimeRange::new(self.daytime_start, self.daytime_end))
            .percentile(self.percentile)
            .build()
    }
}

#[derive(Copy, Clone, Parser)]
pub struct TemperatureArgs {
    /// Target temperature while the electricity is cheap.
    #[clap(long = "high-temperature", default_value = "21", env = "HIGH_TEMPERATURE")]
    pub high: Celsius,

    /// Set-back temperature.
    #[clap(long = "low-temperature", default_value = "16", env = "LOW_TEMPERATURE")]
    pub low: Celsius,
}

impl From<TemperatureArgs> for Temperatures {
    fn from(args: TemperatureArgs) -> Self {
        Self { high: args.high, low: args.low }
    }
}

#[derive(Parser)]
pub struct HomeAssistantArgs {
    /// Home Assistant API base URL.
    #[clap(
        long = "home-assistant-api-base-url",
        default_value = "http://127.0.0.1:8123/api",
        env = "HOME_ASSISTANT_API_BASE_URL"
    )]
    pub base_url: Url,

    /// Home Assistant long-lived access token.
    #[clap(long = "home-assistant-access-token", env = "HOME_ASSISTANT_ACCESS_TOKEN")]
    pub access_token: String,

    /// Climate entities to control, for example: `climate.living_room,climate.hallway`.
    #[clap(long = "entity-ids", env = "ENTITY_IDS", value_delimiter = ',', num_args = 1..)]
    pub entity_ids: Vec<String>,
}

impl HomeAssistantArgs {
    pub fn new_client(&self) -> Result<home_assistant::Api> {
        home_assistant::Api::try_new(
            &self.access_token,
            self.base_url.clone(),
            self.entity_ids.clone(),
        )
    }
}

#[derive(Parser)]
pub struct DispatchArgs {
    /// Do not send the commands to Home Assistant (dry run).
    #[clap(long)]
    pub scout: bool,

    #[clap(flatten)]
    pub temperatures: TemperatureArgs,

    #[clap(flatten)]
    pub home_assistant: HomeAssistantArgs,
}

impl DispatchArgs {
    pub fn new_dispatcher(&self) -> Result<Dispatcher<home_assistant::Api>> {
        Ok(Dispatcher::builder()
            .thermostat(self.home_assistant.new_client()?)
            .temperatures(self.temperatures.into())
            .scout(self.scout)
            .build())
    }
}

#[derive(Parser)]
pub struct PeriodsFileArgs {
    /// Text file with the derived periods, one `HH:MM - HH:MM` per line.
    #[clap(long = "periods-file", default_value = "heating_periods.txt", env = "PERIODS_FILE")]
    pub path: PathBuf,
}

fn parse_time_of_day(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value, TimeRange::FORMAT)
}

fn parse_percentile(value: &str) -> Result<f64> {
    let percentile: f64 = value.parse()?;
    ensure!((0.0..=100.0).contains(&percentile), "must be within 0..=100");
    Ok(percentile)
}
