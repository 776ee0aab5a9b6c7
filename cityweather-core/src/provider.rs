use crate::{
    Config,
    model::{CityId, CityName, ForecastRecord, WeatherRecord},
    provider::openweather::OpenWeatherSource,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Read-only access to a weather provider.
///
/// Every method performs exactly one upstream request.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Provider id of a city, read from its current conditions by name.
    async fn city_id_by_name(&self, city: &CityName) -> anyhow::Result<CityId>;

    async fn current_by_id(&self, id: CityId) -> anyhow::Result<WeatherRecord>;

    async fn forecast_by_id(&self, id: CityId) -> anyhow::Result<ForecastRecord>;
}

/// Construct the OpenWeather source described by `config`.
pub fn source_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherSource>> {
    let api_key = config.api_key()?;

    let source = OpenWeatherSource::new(api_key.to_owned())
        .with_base_url(config.base_url())
        .with_units(config.units);

    Ok(Arc::new(source))
}
