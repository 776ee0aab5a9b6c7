use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A city as the provider's `q=` parameter expects it, e.g. `"London,uk"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityName(String);

impl CityName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CityName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Provider-assigned numeric id of a city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(pub u64);

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// One snapshot of current conditions for a city.
///
/// `payload` is the provider body as received; the accessors read the commonly
/// displayed fields out of it and return `None` when a field is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub id: CityId,
    pub name: String,
    pub payload: Value,
}

impl WeatherRecord {
    /// Build a record from a provider body that carries `id` and `name`.
    pub fn from_payload(payload: Value) -> anyhow::Result<Self> {
        #[derive(Deserialize)]
        struct Head {
            id: CityId,
            name: String,
        }

        let head = Head::deserialize(&payload)?;
        Ok(Self { id: head.id, name: head.name, payload })
    }

    pub fn temperature(&self) -> Option<f64> {
        self.payload.pointer("/main/temp")?.as_f64()
    }

    pub fn feels_like(&self) -> Option<f64> {
        self.payload.pointer("/main/feels_like")?.as_f64()
    }

    pub fn humidity_pct(&self) -> Option<u8> {
        let raw = self.payload.pointer("/main/humidity")?.as_u64()?;
        u8::try_from(raw).ok()
    }

    pub fn condition(&self) -> Option<&str> {
        self.payload.pointer("/weather/0/description")?.as_str()
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        let ts = self.payload.get("dt")?.as_i64()?;
        DateTime::from_timestamp(ts, 0)
    }
}

/// One forecast series for a single city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub id: CityId,
    pub payload: Value,
}

/// A single step of a forecast series.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub at: DateTime<Utc>,
    pub temperature: Option<f64>,
    pub condition: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    #[serde(default)]
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

impl ForecastRecord {
    pub fn city_name(&self) -> Option<&str> {
        self.payload.pointer("/city/name")?.as_str()
    }

    /// Forecast steps in provider order. Entries that fail to parse are skipped.
    pub fn points(&self) -> Vec<ForecastPoint> {
        let Some(list) = self.payload.get("list").and_then(Value::as_array) else {
            return Vec::new();
        };

        list.iter()
            .filter_map(|raw| OwForecastEntry::deserialize(raw).ok())
            .filter_map(|entry| {
                let at = DateTime::from_timestamp(entry.dt, 0)?;
                Some(ForecastPoint {
                    at,
                    temperature: entry.main.and_then(|m| m.temp),
                    condition: entry.weather.into_iter().next().map(|w| w.description),
                })
            })
            .collect()
    }
}
