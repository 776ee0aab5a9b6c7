use thiserror::Error;

/// An upstream fetch failed.
///
/// Network errors, non-success statuses and malformed bodies all land here as
/// a rendered message; the variant only records which store operation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Error fetching city IDs: {0}")]
    CityIds(String),

    #[error("Error fetching weather data: {0}")]
    Weather(String),

    #[error("Error fetching forecast data: {0}")]
    Forecast(String),
}

impl FetchError {
    pub fn cause(&self) -> &str {
        match self {
            FetchError::CityIds(cause) | FetchError::Weather(cause) | FetchError::Forecast(cause) => {
                cause
            }
        }
    }
}
