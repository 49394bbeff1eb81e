use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use itertools::Itertools;
use reqwest::Url;
use serde::Deserialize;
use serde_with::serde_as;

use crate::{core::price::PriceRecord, planner::PriceFeed, prelude::*};

/// Octopus Energy tariff feed.
pub struct Api {
    client: reqwest::Client,
    url: Url,
}

impl Api {
    pub fn new(product_code: &str, tariff_code: &str) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
        let url = Url::parse(&format!(
            "https://api.octopus.energy/v1/products/{product_code}/electricity-tariffs/{tariff_code}/standard-unit-rates/"
        ))?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl PriceFeed for Api {
    #[instrument(skip_all, fields(on = %on))]
    async fn get_rates(&self, on: NaiveDate, time_zone: Tz) -> Result<Vec<PriceRecord>> {
        info!("fetching…");
        let period_from = start_of_day(on, time_zone)?;
        let period_to = start_of_day(
            on.checked_add_days(Days::new(1)).context("the date is out of range")?,
            time_zone,
        )?;
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair("period_from", &period_from.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("period_to", &period_to.to_rfc3339_opts(SecondsFormat::Secs, true));
        let response: Response = self
            .client
            .get(url)
            .send()
            .await
            .context("failed to request the unit rates")?
            .error_for_status()?
            .json()
            .await
            .context("failed to deserialize the unit rates")?;
        let records = response
            .results
            .into_iter()
            .filter(|record| record.valid_from.with_timezone(&time_zone).date_naive() == on)
            .sorted_by_key(|record| record.valid_from)
            .collect_vec();
        info!(len = records.len(), "fetched");
        Ok(records)
    }
}

fn start_of_day(on: NaiveDate, time_zone: Tz) -> Result<DateTime<Utc>> {
    let start = on
        .and_time(NaiveTime::MIN)
        .and_local_timezone(time_zone)
        .earliest()
        .with_context(|| format!("`{on}` has no midnight in `{time_zone}`"))?;
    Ok(start.with_timezone(&Utc))
}

#[serde_as]
#[derive(Deserialize)]
struct Response {
    #[serde_as(as = "serde_with::VecSkipError<_>")]
    results: Vec<PriceRecord>,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike};

    use super::*;
    use crate::quantity::rate::KilowattHourRate;

    #[test]
    fn test_deserialize_response_ok() -> Result {
        // language=JSON
        const RESPONSE: &str = r#"
            {
                "count": 3,
                "next": null,
                "previous": null,
                "results": [
                    {
                        "value_exc_vat": 20.6,
                        "value_inc_vat": 21.63,
                        "valid_from": "2024-01-15T05:30:00Z",
                        "valid_to": "2024-01-15T06:00:00Z",
                        "payment_method": null
                    },
                    {
                        "value_exc_vat": 19.0,
                        "value_inc_vat": "invalid",
                        "valid_from": "2024-01-15T05:00:00Z",
                        "valid_to": "2024-01-15T05:30:00Z",
                        "payment_method": null
                    },
                    {
                        "value_exc_vat": 18.0,
                        "value_inc_vat": 18.9,
                        "valid_from": "yesterday",
                        "valid_to": "2024-01-15T05:00:00Z",
                        "payment_method": null
                    },
                    {
                        "value_exc_vat": 15.0,
                        "value_inc_vat": 15.75,
                        "valid_from": "2024-01-15T04:30:00Z",
                        "valid_to": "2024-01-15T05:00:00Z",
                        "payment_method": null
                    }
                ]
            }
        "#;
        let response = serde_json::from_str::<Response>(RESPONSE)?;
        assert_eq!(
            response.results,
            [
                PriceRecord {
                    valid_from: Utc.with_ymd_and_hms(2024, 1, 15, 5, 30, 0).unwrap(),
                    value_inc_vat: KilowattHourRate::from(21.63),
                },
                PriceRecord {
                    valid_from: Utc.with_ymd_and_hms(2024, 1, 15, 4, 30, 0).unwrap(),
                    value_inc_vat: KilowattHourRate::from(15.75),
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_start_of_day_in_summer() -> Result {
        let start = start_of_day(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(), Tz::Europe__London)?;
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 6, 30, 23, 0, 0).unwrap());
        Ok(())
    }

    #[tokio::test]
    #[ignore = "makes the API request"]
    async fn test_get_rates_ok() -> Result {
        let time_zone = Tz::Europe__London;
        let today = Utc::now().with_timezone(&time_zone).date_naive();
        let records = Api::new("AGILE-23-12-06", "E-1R-AGILE-23-12-06-L")?
            .get_rates(today, time_zone)
            .await?;
        assert!(!records.is_empty());
        assert!(records.len() <= 50);
        assert!(records.iter().is_sorted_by_key(|record| record.valid_from));
        assert_eq!(records[0].valid_from.with_timezone(&time_zone).minute() % 30, 0);
        Ok(())
    }
}
