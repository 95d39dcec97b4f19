use async_trait::async_trait;
use reqwest::Client;

use crate::model::{AirQualityReading, Coordinates};

use super::{
    AirQualityProvider, ProviderId, UpstreamFailure, decode_body, success_body, trim_base_url,
};

pub const AIRVISUAL_BASE_URL: &str = "http://api.airvisual.com";

#[derive(Debug, Clone)]
pub struct AirVisualProvider {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl AirVisualProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: AIRVISUAL_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base_url(base_url);
        self
    }
}

#[async_trait]
impl AirQualityProvider for AirVisualProvider {
    async fn nearest_city(
        &self,
        coords: Coordinates,
    ) -> Result<AirQualityReading, UpstreamFailure> {
        const PROVIDER: ProviderId = ProviderId::AirVisual;

        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamFailure::MissingCredential { provider: PROVIDER })?;

        let lat = coords.lat.to_string();
        let lon = coords.lon.to_string();

        let res = self
            .http
            .get(format!("{}/v2/nearest_city", self.base_url))
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("key", api_key),
            ])
            .send()
            .await
            .map_err(|source| UpstreamFailure::Transport {
                provider: PROVIDER,
                source,
            })?;

        let body = success_body(PROVIDER, res).await?;

        decode_body(PROVIDER, &body)
    }
}
