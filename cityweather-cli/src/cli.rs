use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use cityweather_core::{CityId, Config, FetchError, JoinPolicy, Units, WeatherStore};
use inquire::{Password, PasswordDisplayMode, Select};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Weather for a fixed set of cities")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and display preferences.
    Configure,

    /// Resolve the configured cities and list their provider ids.
    Cities,

    /// Show current weather for every configured city.
    Show {
        /// Only show cities whose name contains this text (case-insensitive).
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Show the forecast for one city.
    Forecast {
        /// Text matched against the city names; the first match is used.
        city: Option<String>,

        /// Provider city id; skips resolving the configured cities.
        #[arg(long, conflicts_with = "city")]
        id: Option<u64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Cities => {
                let (_, store) = open_store()?;
                settle(&store, store.resolve_city_ids().await)?;
                render::print_cities(&store.resolved_cities());
                Ok(())
            }
            Command::Show { search } => {
                let (config, store) = open_store()?;
                settle(&store, store.resolve_city_ids().await)?;
                settle(&store, store.fetch_weather().await)?;

                if let Some(query) = search {
                    store.set_search_query(query);
                }

                render::print_weather(&store.filtered_weather(), config.units);
                Ok(())
            }
            Command::Forecast { city, id } => {
                let (config, store) = open_store()?;

                let id = match (id, city) {
                    (Some(raw), _) => Some(CityId(raw)),
                    (None, Some(query)) => {
                        settle(&store, store.resolve_city_ids().await)?;
                        settle(&store, store.fetch_weather().await)?;
                        Some(first_match(&store, &query)?)
                    }
                    (None, None) => None,
                };

                let forecast = settle(&store, store.fetch_forecast(id).await)?;
                for record in &forecast {
                    render::print_forecast(record, config.units);
                }
                Ok(())
            }
        }
    }
}

fn open_store() -> anyhow::Result<(Config, WeatherStore)> {
    let config = Config::load()?;
    let store = WeatherStore::from_config(&config)?;
    Ok((config, store))
}

/// Id of the first fetched city whose name contains `query`.
fn first_match(store: &WeatherStore, query: &str) -> anyhow::Result<CityId> {
    store.set_search_query(query);
    match store.filtered_weather().first() {
        Some(record) => Ok(record.id),
        None => bail!("No configured city matches '{query}'"),
    }
}

/// Turn a store failure into a CLI error carrying the store's error message.
fn settle<T>(store: &WeatherStore, result: Result<T, FetchError>) -> anyhow::Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => {
            let message = store.error().unwrap_or_else(|| err.to_string());
            bail!(message)
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    let units = Select::new("Units:", Units::all().to_vec())
        .prompt()
        .context("Failed to read units")?;

    let policy = Select::new(
        "When one city fails to load:",
        vec!["discard the whole batch", "show the cities that loaded"],
    )
    .prompt()
    .context("Failed to read failure policy")?;

    config.api_key = Some(api_key.trim().to_string());
    config.units = Some(units);
    config.join_policy = if policy.starts_with("discard") {
        JoinPolicy::FailFast
    } else {
        JoinPolicy::SkipFailed
    };

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}
