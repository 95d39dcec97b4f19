//! HTTP surface of the aggregation gateway.
//!
//! Every route answers 200: upstream failures are absorbed by [`Gateway`]
//! and malformed requests are treated the same way.

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, post},
};
use climatelens_core::{AirQualityReading, Coordinates, Gateway, SummaryText, WeatherReading};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    #[serde(default)]
    pub city: String,
}

/// Coordinates arrive as raw strings so a bad value can still be answered.
#[derive(Debug, Deserialize)]
pub struct AirQualityQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl AirQualityQuery {
    fn coordinates(&self) -> Option<Coordinates> {
        let lat = self.lat.as_deref()?.trim().parse().ok()?;
        let lon = self.lon.as_deref()?.trim().parse().ok()?;
        Some(Coordinates::new(lat, lon))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// GET /weather?city= - Current weather, live or seed
///
/// An unreadable query string (e.g. a repeated `city`) is looked up as an
/// empty city.
async fn weather(
    State(state): State<AppState>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Json<WeatherReading> {
    let city = match query {
        Ok(Query(query)) => query.city,
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable weather query; using empty city");
            String::new()
        }
    };
    Json(state.gateway.get_weather(&city).await)
}

/// GET /airquality?lat=&lon= - Air quality near a coordinate, live or seed
async fn air_quality(
    State(state): State<AppState>,
    query: Result<Query<AirQualityQuery>, QueryRejection>,
) -> Json<AirQualityReading> {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable air quality query");
            return Json(state.gateway.air_quality_fallback("unreadable query"));
        }
    };
    let reading = match query.coordinates() {
        Some(coords) => state.gateway.get_air_quality(coords).await,
        None => state
            .gateway
            .air_quality_fallback("missing or invalid coordinates"),
    };
    Json(reading)
}

/// POST /summary - Summary of the posted text, live or seed
async fn summary(
    State(state): State<AppState>,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> Json<SummaryText> {
    let request = payload
        .map(|Json(request)| request)
        .unwrap_or_else(|rejection| {
            warn!(error = %rejection, "Unreadable summary request; forwarding empty text");
            SummaryRequest::default()
        });
    Json(state.gateway.get_summary(&request.text).await)
}

/// GET /health - Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

fn gateway_routes() -> Router<AppState> {
    Router::new()
        .route("/weather", get(weather))
        .route("/airquality", get(air_quality))
        .route("/summary", post(summary))
}

/// Create the HTTP router
pub fn create_router(gateway: Gateway) -> Router {
    let state = AppState { gateway };

    // Dashboards are served from other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .merge(gateway_routes())
        .nest("/api", gateway_routes().route("/ai-summary", post(summary)))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server until Ctrl-C
pub async fn run_http_server(gateway: Gateway, port: u16) -> Result<()> {
    let app = create_router(gateway);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;
    info!("Gateway listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutting down gracefully");
            }
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(lat: Option<&str>, lon: Option<&str>) -> AirQualityQuery {
        AirQualityQuery {
            lat: lat.map(str::to_owned),
            lon: lon.map(str::to_owned),
        }
    }

    #[test]
    fn parses_coordinates() {
        assert_eq!(
            query(Some("51.5074"), Some(" -0.1278")).coordinates(),
            Some(Coordinates::new(51.5074, -0.1278))
        );
    }

    #[test]
    fn rejects_missing_or_bad_coordinates() {
        assert_eq!(query(None, Some("1")).coordinates(), None);
        assert_eq!(query(Some("undefined"), Some("1")).coordinates(), None);
    }
}
