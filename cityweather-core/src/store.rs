//! The weather store: resolved city ids, fetched records, search query and
//! the last error, plus the three fetch operations that fill them.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::instrument;

use crate::{
    Config,
    batch::{BatchOutcome, JoinPolicy, run_batch},
    error::FetchError,
    filter::filter_by_name,
    model::{CityId, CityName, ForecastRecord, WeatherRecord},
    provider::{WeatherSource, source_from_config},
};

#[derive(Debug, Default)]
struct State {
    resolved: Vec<(CityName, CityId)>,
    weather: Vec<WeatherRecord>,
    forecast: Vec<ForecastRecord>,
    search_query: String,
    error: Option<String>,
}

/// Owns all state shown by the front-end.
///
/// Operations take `&self`; state is only locked for the commit after a batch
/// settles. Two overlapping calls of the same operation are not serialized:
/// whichever batch settles last overwrites the other.
#[derive(Debug)]
pub struct WeatherStore {
    source: Arc<dyn WeatherSource>,
    cities: Vec<CityName>,
    policy: JoinPolicy,
    state: RwLock<State>,
}

impl WeatherStore {
    pub fn new(source: Arc<dyn WeatherSource>, cities: Vec<CityName>, policy: JoinPolicy) -> Self {
        Self { source, cities, policy, state: RwLock::new(State::default()) }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let source = source_from_config(config)?;
        Ok(Self::new(source, config.cities(), config.join_policy))
    }

    /// Look up the provider id of every configured city.
    ///
    /// Each id is committed together with the name it was resolved from, so
    /// a city skipped under [`JoinPolicy::SkipFailed`] does not shift the
    /// pairing of the ones after it.
    #[instrument(skip(self), fields(cities = self.cities.len()))]
    pub async fn resolve_city_ids(&self) -> Result<Vec<CityId>, FetchError> {
        let source = Arc::clone(&self.source);
        let outcome = run_batch(self.cities.clone(), self.policy, move |city| {
            let source = Arc::clone(&source);
            async move {
                let id = source.city_id_by_name(&city).await?;
                Ok::<_, anyhow::Error>((city, id))
            }
        })
        .await;

        let pairs = self.commit(outcome, FetchError::CityIds, |state, pairs| state.resolved = pairs)?;
        Ok(pairs.into_iter().map(|(_, id)| id).collect())
    }

    /// Fetch current conditions for every resolved id. With no ids resolved
    /// this commits an empty collection.
    #[instrument(skip(self))]
    pub async fn fetch_weather(&self) -> Result<Vec<WeatherRecord>, FetchError> {
        let ids = self.city_ids();

        let source = Arc::clone(&self.source);
        let outcome = run_batch(ids, self.policy, move |id| {
            let source = Arc::clone(&source);
            async move { source.current_by_id(id).await }
        })
        .await;

        self.commit(outcome, FetchError::Weather, |state, records| state.weather = records)
    }

    /// Fetch the forecast for a single city.
    ///
    /// `None` is rejected without a request: the error slot is set and the
    /// current forecast is kept.
    #[instrument(skip(self))]
    pub async fn fetch_forecast(
        &self,
        id: Option<CityId>,
    ) -> Result<Vec<ForecastRecord>, FetchError> {
        let Some(id) = id else {
            let err = FetchError::Forecast("no city id provided".to_string());
            self.record_failure(&err);
            return Err(err);
        };

        let source = Arc::clone(&self.source);
        let outcome = run_batch(vec![id], self.policy, move |id| {
            let source = Arc::clone(&source);
            async move { source.forecast_by_id(id).await }
        })
        .await;

        self.commit(outcome, FetchError::Forecast, |state, records| state.forecast = records)
    }

    fn commit<T: Clone>(
        &self,
        outcome: BatchOutcome<T>,
        wrap: fn(String) -> FetchError,
        apply: impl FnOnce(&mut State, Vec<T>),
    ) -> Result<Vec<T>, FetchError> {
        match outcome {
            BatchOutcome::Success(items) => {
                tracing::info!(count = items.len(), "batch committed");
                apply(&mut *self.state.write(), items.clone());
                Ok(items)
            }
            BatchOutcome::Partial { items, failure } => {
                let err = wrap(format!("{failure:#}"));
                tracing::warn!(count = items.len(), error = %err, "batch committed without failed requests");
                let mut state = self.state.write();
                apply(&mut *state, items.clone());
                state.error = Some(err.to_string());
                Ok(items)
            }
            BatchOutcome::Failure(failure) => {
                let err = wrap(format!("{failure:#}"));
                self.record_failure(&err);
                Err(err)
            }
        }
    }

    fn record_failure(&self, err: &FetchError) {
        tracing::error!(error = %err, "fetch failed");
        self.state.write().error = Some(err.to_string());
    }

    pub fn cities(&self) -> &[CityName] {
        &self.cities
    }

    pub fn city_ids(&self) -> Vec<CityId> {
        self.state.read().resolved.iter().map(|(_, id)| *id).collect()
    }

    /// Resolved cities with their ids, in configured order.
    pub fn resolved_cities(&self) -> Vec<(CityName, CityId)> {
        self.state.read().resolved.clone()
    }

    pub fn weather(&self) -> Vec<WeatherRecord> {
        self.state.read().weather.clone()
    }

    pub fn forecast(&self) -> Vec<ForecastRecord> {
        self.state.read().forecast.clone()
    }

    /// Message of the most recent failure, if any.
    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn clear_error(&self) {
        self.state.write().error = None;
    }

    pub fn search_query(&self) -> String {
        self.state.read().search_query.clone()
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        self.state.write().search_query = query.into();
    }

    /// Weather records whose name contains the search query, ignoring case.
    pub fn filtered_weather(&self) -> Vec<WeatherRecord> {
        let state = self.state.read();
        filter_by_name(&state.weather, &state.search_query).into_iter().cloned().collect()
    }
}
