//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The `WeatherSource` abstraction and its OpenWeather implementation
//! - Concurrent batch fetching with an explicit join policy
//! - `WeatherStore`, which resolves city ids, fetches weather and forecasts,
//!   and exposes a search-filtered view
//!
//! It is used by `cityweather-cli`, but can also be reused by other front-ends.

pub mod batch;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod provider;
pub mod store;

pub use batch::{BatchOutcome, JoinPolicy};
pub use config::{Config, Units};
pub use error::FetchError;
pub use model::{CityId, CityName, ForecastPoint, ForecastRecord, WeatherRecord};
pub use provider::{WeatherSource, openweather::OpenWeatherSource};
pub use store::WeatherStore;
