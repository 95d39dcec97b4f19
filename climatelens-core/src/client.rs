use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::{
    dashboard::ClimateApi,
    model::{AirQualityReading, Coordinates, SummaryText, WeatherReading},
    provider::trim_base_url,
};

pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:5000";

/// Talks to a running gateway over its HTTP surface.
#[derive(Debug, Clone)]
pub struct HttpGatewayClient {
    base_url: String,
    http: Client,
}

#[derive(Debug, Serialize)]
struct SummaryRequest<'a> {
    text: &'a str,
}

impl HttpGatewayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base_url(base_url),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for HttpGatewayClient {
    fn default() -> Self {
        Self::new(DEFAULT_GATEWAY_URL)
    }
}

#[async_trait]
impl ClimateApi for HttpGatewayClient {
    async fn get_weather(&self, city: &str) -> Result<WeatherReading> {
        self.http
            .get(format!("{}/weather", self.base_url))
            .query(&[("city", city)])
            .send()
            .await
            .context("Failed to send weather request to gateway")?
            .error_for_status()
            .context("Gateway weather request failed")?
            .json()
            .await
            .context("Failed to parse gateway weather JSON")
    }

    async fn get_air_quality(&self, coords: Coordinates) -> Result<AirQualityReading> {
        self.http
            .get(format!("{}/airquality", self.base_url))
            .query(&[("lat", coords.lat), ("lon", coords.lon)])
            .send()
            .await
            .context("Failed to send air quality request to gateway")?
            .error_for_status()
            .context("Gateway air quality request failed")?
            .json()
            .await
            .context("Failed to parse gateway air quality JSON")
    }

    async fn get_summary(&self, text: &str) -> Result<SummaryText> {
        self.http
            .post(format!("{}/summary", self.base_url))
            .json(&SummaryRequest { text })
            .send()
            .await
            .context("Failed to send summary request to gateway")?
            .error_for_status()
            .context("Gateway summary request failed")?
            .json()
            .await
            .context("Failed to parse gateway summary JSON")
    }
}
