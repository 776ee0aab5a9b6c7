//! Integration tests for the OpenWeather source and the store, against a
//! wiremock server standing in for the provider.

use std::sync::Arc;

use cityweather_core::{
    CityId, CityName, FetchError, JoinPolicy, OpenWeatherSource, Units, WeatherSource,
    WeatherStore,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "test-key";

fn current_json(id: u64, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "dt": 1_700_000_000,
        "main": { "temp": 283.2, "feels_like": 281.9, "humidity": 76 },
        "weather": [{ "description": "overcast clouds" }]
    })
}

fn source(server: &MockServer) -> OpenWeatherSource {
    OpenWeatherSource::new(KEY.to_string()).with_base_url(format!("{}/data/2.5/", server.uri()))
}

fn store(server: &MockServer, cities: &[&str]) -> WeatherStore {
    let cities = cities.iter().copied().map(CityName::from).collect();
    WeatherStore::new(Arc::new(source(server)), cities, JoinPolicy::FailFast)
}

async fn mock_by_name(server: &MockServer, city: &str, id: u64, name: &str) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", city))
        .and(query_param("APPID", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_json(id, name)))
        .mount(server)
        .await;
}

async fn mock_by_id(server: &MockServer, id: u64, name: &str) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("id", id.to_string()))
        .and(query_param("APPID", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_json(id, name)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn london_end_to_end() {
    let server = MockServer::start().await;
    mock_by_name(&server, "London,uk", 2643743, "London").await;
    mock_by_id(&server, 2643743, "London").await;

    let store = store(&server, &["London,uk"]);

    let ids = store.resolve_city_ids().await.expect("resolution succeeds");
    assert_eq!(ids, vec![CityId(2643743)]);

    store.fetch_weather().await.expect("weather succeeds");
    store.set_search_query("lond");

    let filtered = store.filtered_weather();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, CityId(2643743));
    assert_eq!(filtered[0].name, "London");
    assert_eq!(filtered[0].condition(), Some("overcast clouds"));
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn resolution_preserves_city_order() {
    let server = MockServer::start().await;
    mock_by_name(&server, "Tokyo,jpn", 1850147, "Tokyo").await;
    mock_by_name(&server, "London,uk", 2643743, "London").await;
    mock_by_name(&server, "Milan,italy", 3173435, "Milan").await;

    let store = store(&server, &["Tokyo,jpn", "London,uk", "Milan,italy"]);
    let ids = store.resolve_city_ids().await.unwrap();

    assert_eq!(ids, vec![CityId(1850147), CityId(2643743), CityId(3173435)]);
}

#[tokio::test]
async fn non_success_status_fails_the_whole_batch() {
    let server = MockServer::start().await;
    mock_by_name(&server, "London,uk", 2643743, "London").await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Atlantis,xx"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
        )
        .mount(&server)
        .await;

    let store = store(&server, &["London,uk", "Atlantis,xx"]);
    let err = store.resolve_city_ids().await.unwrap_err();

    assert!(matches!(err, FetchError::CityIds(_)));
    assert!(err.cause().contains("404"));
    assert!(err.cause().contains("city not found"));
    assert!(store.city_ids().is_empty());
    assert!(store.error().unwrap().starts_with("Error fetching city IDs: "));
}

#[tokio::test]
async fn malformed_body_is_a_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = source(&server).city_id_by_name(&CityName::from("London,uk")).await.unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse OpenWeather current weather JSON"));
}

#[tokio::test]
async fn body_without_id_is_a_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "name": "London" })))
        .mount(&server)
        .await;

    let store = store(&server, &["London,uk"]);
    let err = store.resolve_city_ids().await.unwrap_err();
    assert!(err.cause().contains("Malformed OpenWeather current weather for 'London,uk'"));
}

#[tokio::test]
async fn resolution_reads_only_the_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Texas,us"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": 4736286 })))
        .mount(&server)
        .await;

    let store = store(&server, &["Texas,us"]);
    let ids = store.resolve_city_ids().await.expect("id alone is enough");

    assert_eq!(ids, vec![CityId(4736286)]);
    assert_eq!(store.resolved_cities(), vec![(CityName::from("Texas,us"), CityId(4736286))]);
}

#[tokio::test]
async fn units_are_sent_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("id", "2643743"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_json(2643743, "London")))
        .expect(1)
        .mount(&server)
        .await;

    let record = source(&server)
        .with_units(Some(Units::Metric))
        .current_by_id(CityId(2643743))
        .await
        .expect("units matched");

    assert_eq!(record.temperature(), Some(283.2));
}

#[tokio::test]
async fn forecast_is_fetched_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("id", "1850147"))
        .and(query_param("APPID", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "city": { "id": 1850147, "name": "Tokyo", "country": "JP" },
            "list": [
                { "dt": 1_700_000_000, "main": { "temp": 288.0 }, "weather": [{ "description": "clear sky" }] },
                { "dt": 1_700_010_800, "main": { "temp": 286.5 }, "weather": [{ "description": "few clouds" }] }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store(&server, &[]);
    let records = store.fetch_forecast(Some(CityId(1850147))).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].city_name(), Some("Tokyo"));
    let points = records[0].points();
    assert_eq!(points.len(), 2);
    assert_eq!(points[1].condition.as_deref(), Some("few clouds"));
}

#[tokio::test]
async fn forecast_without_id_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = store(&server, &["London,uk"]);
    let err = store.fetch_forecast(None).await.unwrap_err();

    assert_eq!(err.to_string(), "Error fetching forecast data: no city id provided");
    assert!(store.forecast().is_empty());
}
