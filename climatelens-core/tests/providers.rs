use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Query,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use climatelens_core::{
    Coordinates, Gateway, ProviderId, ProviderSet, SeedRepository, UpstreamFailure,
    provider::{
        AirQualityProvider, AirVisualProvider, OpenAiProvider, OpenWeatherProvider,
        SummaryProvider, WeatherProvider,
    },
};
use serde_json::{Value, json};

/// Body the stub serves for "Reykjavik": valid JSON, but most fields missing.
const PARTIAL_BODY: &str = r#"{"main":{"temp":22},"name":"Reykjavik"}"#;

async fn weather(Query(q): Query<HashMap<String, String>>) -> Response {
    if q.get("appid").map(String::as_str) != Some("ow-key") {
        let body = json!({ "cod": 401, "message": "Invalid API key" });
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }
    match q.get("q").map(String::as_str) {
        Some("London") if q.get("units").map(String::as_str) == Some("metric") => (
            StatusCode::OK,
            Json(json!({
                "coord": { "lon": -0.1278, "lat": 51.5074 },
                "weather": [{ "description": "broken clouds" }],
                "main": { "temp": 12.5, "humidity": 71 },
                "name": "London"
            })),
        )
            .into_response(),
        Some("Reykjavik") => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            PARTIAL_BODY,
        )
            .into_response(),
        Some("Garbled") => (StatusCode::OK, "<html>maintenance</html>").into_response(),
        _ => {
            let body = json!({ "cod": "404", "message": "city not found" });
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
    }
}

async fn nearest_city(Query(q): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    if q.get("key").map(String::as_str) != Some("aq-key") {
        return (StatusCode::FORBIDDEN, Json(json!({ "status": "fail" })));
    }
    let city = format!("near {},{}", q["lat"], q["lon"]);
    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "data": { "city": city, "current": { "pollution": { "aqius": 23 } } }
        })),
    )
}

async fn completions(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer sk-test") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad key" })));
    }
    let prompt = body["messages"][0]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    if prompt.ends_with("EMPTY") {
        return (StatusCode::OK, Json(json!({ "choices": [] })));
    }
    let content = format!("{} | {}", body["model"], prompt);
    (
        StatusCode::OK,
        Json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })),
    )
}

async fn spawn_upstream() -> String {
    let app = Router::new()
        .route("/data/2.5/weather", get(weather))
        .route("/v2/nearest_city", get(nearest_city))
        .route("/v1/chat/completions", post(completions));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve stub") });
    format!("http://{addr}")
}

#[tokio::test]
async fn openweather_parses_current_weather() {
    let base = spawn_upstream().await;
    let provider = OpenWeatherProvider::new(Some("ow-key".into())).with_base_url(&base);

    let reading = provider.current_weather("London").await.expect("live reading");

    assert_eq!(reading.temperature(), Some(12.5));
    assert_eq!(reading.humidity(), Some(71));
    assert_eq!(reading.condition_description(), "broken clouds");
    assert_eq!(
        reading.coordinates(),
        Some(Coordinates::new(51.5074, -0.1278))
    );
    assert_eq!(reading.as_value()["name"], json!("London"));
}

#[tokio::test]
async fn openweather_non_success_is_status_failure() {
    let base = spawn_upstream().await;
    let provider = OpenWeatherProvider::new(Some("ow-key".into())).with_base_url(&base);

    let err = provider.current_weather("Atlantis").await.unwrap_err();

    match err {
        UpstreamFailure::Status {
            provider,
            status,
            body,
        } => {
            assert_eq!(provider, ProviderId::OpenWeather);
            assert_eq!(status.as_u16(), 404);
            assert!(body.contains("city not found"));
        }
        other => panic!("unexpected failure: {other:?}"),
    }
}

#[tokio::test]
async fn openweather_wrong_key_is_status_failure() {
    let base = spawn_upstream().await;
    let provider = OpenWeatherProvider::new(Some("nope".into())).with_base_url(&base);

    let err = provider.current_weather("London").await.unwrap_err();

    assert!(matches!(err, UpstreamFailure::Status { status, .. } if status.as_u16() == 401));
}

#[tokio::test]
async fn openweather_non_json_body_is_decode_failure() {
    let base = spawn_upstream().await;
    let provider = OpenWeatherProvider::new(Some("ow-key".into())).with_base_url(&base);

    let err = provider.current_weather("Garbled").await.unwrap_err();

    assert!(matches!(
        err,
        UpstreamFailure::Decode {
            provider: ProviderId::OpenWeather,
            ..
        }
    ));
}

#[tokio::test]
async fn openweather_partial_body_is_a_live_reading() {
    let base = spawn_upstream().await;
    let provider = OpenWeatherProvider::new(Some("ow-key".into())).with_base_url(&base);

    let reading = provider.current_weather("Reykjavik").await.expect("live reading");

    assert_eq!(reading.temperature(), Some(22.0));
    assert_eq!(reading.humidity(), None);
    assert_eq!(reading.condition_description(), "Unknown");
    assert_eq!(reading.coordinates(), None);
}

#[tokio::test]
async fn gateway_relays_partial_body_byte_for_byte() {
    let base = spawn_upstream().await;
    let providers = ProviderSet {
        weather: Arc::new(OpenWeatherProvider::new(Some("ow-key".into())).with_base_url(&base)),
        air_quality: Arc::new(AirVisualProvider::new(None)),
        summary: Arc::new(OpenAiProvider::new(None)),
    };
    let gateway = Gateway::new(providers, Arc::new(SeedRepository::default()));

    let reading = gateway.get_weather("Reykjavik").await;

    // Integer temperature stays an integer; nothing from the seed leaks in.
    assert_eq!(serde_json::to_string(&reading).unwrap(), PARTIAL_BODY);
}

#[tokio::test]
async fn unreachable_upstream_is_transport_failure() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let provider = AirVisualProvider::new(Some("aq-key".into()))
        .with_base_url(format!("http://{addr}"));
    let err = provider
        .nearest_city(Coordinates::new(1.0, 2.0))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        UpstreamFailure::Transport {
            provider: ProviderId::AirVisual,
            ..
        }
    ));
}

#[tokio::test]
async fn airvisual_sends_coordinates() {
    let base = spawn_upstream().await;
    let provider = AirVisualProvider::new(Some("aq-key".into())).with_base_url(&base);

    let reading = provider
        .nearest_city(Coordinates::new(51.5074, -0.1278))
        .await
        .expect("live reading");

    assert_eq!(reading.city_label(), Some("near 51.5074,-0.1278"));
    assert_eq!(reading.air_quality_index(), Some(23));
    assert_eq!(reading.as_value()["status"], json!("success"));
}

#[tokio::test]
async fn openai_returns_first_choice() {
    let base = spawn_upstream().await;
    let provider = OpenAiProvider::new(Some("sk-test".into())).with_base_url(&base);

    let summary = provider.summarize("Weather: null").await.expect("live summary");

    assert_eq!(
        summary.body(),
        "\"gpt-4o-mini\" | Summarize this climate data for students: Weather: null"
    );
}

#[tokio::test]
async fn openai_without_choices_is_decode_failure() {
    let base = spawn_upstream().await;
    let provider = OpenAiProvider::new(Some("sk-test".into())).with_base_url(&base);

    let err = provider.summarize("EMPTY").await.unwrap_err();

    assert!(matches!(
        err,
        UpstreamFailure::Decode {
            provider: ProviderId::OpenAi,
            ..
        }
    ));
}

#[tokio::test]
async fn openai_bad_key_is_status_failure() {
    let base = spawn_upstream().await;
    let provider = OpenAiProvider::new(Some("sk-wrong".into())).with_base_url(&base);

    let err = provider.summarize("anything").await.unwrap_err();

    assert!(matches!(
        err,
        UpstreamFailure::Status {
            provider: ProviderId::OpenAi,
            ..
        }
    ));
}
