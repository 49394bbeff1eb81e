use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client,
    ClientBuilder,
    Url,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use serde::Serialize;

use crate::{dispatch::Thermostat, prelude::*, quantity::temperature::Celsius};

/// Home Assistant climate entities controlled together.
pub struct Api {
    client: Client,
    base_url: Url,
    entity_ids: Vec<String>,
}

impl Api {
    pub fn try_new(access_token: &str, base_url: Url, entity_ids: Vec<String>) -> Result<Self> {
        ensure!(!entity_ids.is_empty(), "at least one entity ID is required");
        let headers = HeaderMap::from_iter([(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&format!("Bearer {access_token}"))?,
        )]);
        let client = ClientBuilder::new()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, base_url, entity_ids })
    }

    fn service_url(&self, domain: &str, service: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("invalid base URL"))?
            .pop_if_empty()
            .push("services")
            .push(domain)
            .push(service);
        Ok(url)
    }
}

#[async_trait]
impl Thermostat for Api {
    #[instrument(skip_all, fields(temperature = %temperature))]
    async fn set_temperature(&self, temperature: Celsius) -> Result {
        let request = SetTemperatureRequest { entity_ids: &self.entity_ids, temperature };
        let response = self
            .client
            .post(self.service_url("climate", "set_temperature")?)
            .json(&request)
            .send()
            .await
            .context("failed to call `climate.set_temperature`")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("`climate.set_temperature` failed with `{status}`: {body}");
        }
        info!(entity_ids = ?self.entity_ids, "done");
        Ok(())
    }
}

#[derive(Serialize)]
struct SetTemperatureRequest<'a> {
    #[serde(rename = "entity_id")]
    entity_ids: &'a [String],

    temperature: Celsius,
}
