use async_trait::async_trait;
use reqwest::Client;

use crate::model::WeatherReading;

use super::{
    ProviderId, UpstreamFailure, WeatherProvider, decode_body, success_body, trim_base_url,
};

pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: OPENWEATHER_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base_url(base_url);
        self
    }

    fn current_url(&self) -> String {
        format!("{}/data/2.5/weather", self.base_url)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, city: &str) -> Result<WeatherReading, UpstreamFailure> {
        const PROVIDER: ProviderId = ProviderId::OpenWeather;

        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamFailure::MissingCredential { provider: PROVIDER })?;

        let res = self
            .http
            .get(self.current_url())
            .query(&[
                ("q", city),
                ("appid", api_key),
                ("units", "metric"),
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
