use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    config::{DEFAULT_BASE_URL, Units},
    model::{CityId, CityName, ForecastRecord, WeatherRecord},
};

use super::WeatherSource;

#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    api_key: String,
    base_url: String,
    units: Option<Units>,
    http: Client,
}

impl OpenWeatherSource {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            units: None,
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_units(mut self, units: Option<Units>) -> Self {
        self.units = units;
        self
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), name)
    }

    /// GET `{base}/{endpoint}` with the given lookup parameter plus `APPID`
    /// (and `units` when configured), returning the parsed JSON body.
    async fn get_json(&self, endpoint: &str, lookup: (&str, &str), what: &str) -> Result<Value> {
        let mut query = vec![lookup, ("APPID", self.api_key.as_str())];
        if let Some(units) = self.units {
            query.push(("units", units.as_str()));
        }

        tracing::debug!(endpoint, key = lookup.0, value = lookup.1, "requesting OpenWeather {what}");

        let res = self
            .http
            .get(self.endpoint(endpoint))
            .query(&query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {what} request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body).with_context(|| format!("Failed to parse OpenWeather {what} JSON"))
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    async fn city_id_by_name(&self, city: &CityName) -> Result<CityId> {
        #[derive(Deserialize)]
        struct OwCityRef {
            id: CityId,
        }

        let body = self.get_json("weather", ("q", city.as_str()), "current weather").await?;
        let city_ref = OwCityRef::deserialize(&body)
            .with_context(|| format!("Malformed OpenWeather current weather for '{city}'"))?;
        Ok(city_ref.id)
    }

    async fn current_by_id(&self, id: CityId) -> Result<WeatherRecord> {
        let id = id.to_string();
        let body = self.get_json("weather", ("id", id.as_str()), "current weather").await?;
        WeatherRecord::from_payload(body)
            .with_context(|| format!("Malformed OpenWeather current weather for city {id}"))
    }

    async fn forecast_by_id(&self, id: CityId) -> Result<ForecastRecord> {
        let raw_id = id.to_string();
        let body = self.get_json("forecast", ("id", raw_id.as_str()), "forecast").await?;
        Ok(ForecastRecord { id, payload: body })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
