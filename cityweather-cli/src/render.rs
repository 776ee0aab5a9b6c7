use chrono::{DateTime, Local, Utc};
use cityweather_core::{CityId, CityName, ForecastRecord, Units, WeatherRecord};

pub fn print_cities(resolved: &[(CityName, CityId)]) {
    for line in city_lines(resolved) {
        println!("{line}");
    }
}

fn city_lines(resolved: &[(CityName, CityId)]) -> Vec<String> {
    resolved.iter().map(|(city, id)| format!("{id:>10}  {city}")).collect()
}

pub fn print_weather(records: &[WeatherRecord], units: Option<Units>) {
    if records.is_empty() {
        println!("No matching cities.");
        return;
    }

    for record in records {
        println!(
            "{:<20} {:>10}  {:<24} {}",
            record.name,
            temperature(record.temperature(), units),
            record.condition().unwrap_or("-"),
            local_time(record.observed_at()),
        );
    }
}

pub fn print_forecast(record: &ForecastRecord, units: Option<Units>) {
    let title = record.city_name().map(str::to_string).unwrap_or_else(|| record.id.to_string());
    println!("Forecast for {title}");

    for point in record.points() {
        println!(
            "  {}  {:>10}  {}",
            local_time(Some(point.at)),
            temperature(point.temperature, units),
            point.condition.as_deref().unwrap_or("-"),
        );
    }
}

fn temperature(value: Option<f64>, units: Option<Units>) -> String {
    let suffix = units.unwrap_or(Units::Standard).temperature_suffix();
    match value {
        Some(v) => format!("{v:.1}{suffix}"),
        None => "-".to_string(),
    }
}

fn local_time(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}
