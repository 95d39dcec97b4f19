use crate::{
    Config,
    model::{AirQualityReading, Coordinates, SummaryText, WeatherReading},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::{convert::TryFrom, fmt::Debug, sync::Arc};

pub mod airvisual;
pub mod openai;
pub mod openweather;

pub use airvisual::AirVisualProvider;
pub use openai::OpenAiProvider;
pub use openweather::OpenWeatherProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    AirVisual,
    OpenAi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::AirVisual => "airvisual",
            ProviderId::OpenAi => "openai",
        }
    }

    /// Environment variable carrying this provider's credential.
    pub fn env_var(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "OPENWEATHER_API",
            ProviderId::AirVisual => "AQI_API",
            ProviderId::OpenAi => "OPENAI_API",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::AirVisual, ProviderId::OpenAi]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "airvisual" | "aqi" => Ok(ProviderId::AirVisual),
            "openai" => Ok(ProviderId::OpenAi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, airvisual, openai."
            )),
        }
    }
}

/// Any reason a single upstream call did not yield a reading.
///
/// The gateway treats every variant the same way; the split only feeds logs.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamFailure {
    #[error("no API key configured for provider '{provider}'")]
    MissingCredential { provider: ProviderId },

    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: ProviderId,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} request failed with status {status}: {body}")]
    Status {
        provider: ProviderId,
        status: StatusCode,
        body: String,
    },

    /// Success status, but the body is not JSON.
    #[error("failed to parse {provider} response: {source}")]
    Decode {
        provider: ProviderId,
        #[source]
        source: serde_json::Error,
    },
}

impl UpstreamFailure {
    pub fn provider(&self) -> ProviderId {
        match self {
            UpstreamFailure::MissingCredential { provider }
            | UpstreamFailure::Transport { provider, .. }
            | UpstreamFailure::Status { provider, .. }
            | UpstreamFailure::Decode { provider, .. } => *provider,
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, city: &str) -> Result<WeatherReading, UpstreamFailure>;
}

#[async_trait]
pub trait AirQualityProvider: Send + Sync + Debug {
    async fn nearest_city(
        &self,
        coords: Coordinates,
    ) -> Result<AirQualityReading, UpstreamFailure>;
}

#[async_trait]
pub trait SummaryProvider: Send + Sync + Debug {
    async fn summarize(&self, text: &str) -> Result<SummaryText, UpstreamFailure>;
}

/// Live providers built from configuration. Missing keys are allowed; those
/// providers fail every call with `MissingCredential`.
#[derive(Debug, Clone)]
pub struct ProviderSet {
    pub weather: Arc<dyn WeatherProvider>,
    pub air_quality: Arc<dyn AirQualityProvider>,
    pub summary: Arc<dyn SummaryProvider>,
}

impl ProviderSet {
    pub fn from_config(config: &Config) -> Self {
        let key = |id| config.provider_api_key(id).map(str::to_owned);

        let mut weather = OpenWeatherProvider::new(key(ProviderId::OpenWeather));
        if let Some(url) = config.provider_base_url(ProviderId::OpenWeather) {
            weather = weather.with_base_url(url);
        }

        let mut air_quality = AirVisualProvider::new(key(ProviderId::AirVisual));
        if let Some(url) = config.provider_base_url(ProviderId::AirVisual) {
            air_quality = air_quality.with_base_url(url);
        }

        let mut summary = OpenAiProvider::new(key(ProviderId::OpenAi))
            .with_model(config.summary.model.clone());
        if let Some(url) = config.provider_base_url(ProviderId::OpenAi) {
            summary = summary.with_base_url(url);
        }

        Self {
            weather: Arc::new(weather),
            air_quality: Arc::new(air_quality),
            summary: Arc::new(summary),
        }
    }
}

/// Read a response body and turn a non-success status into `UpstreamFailure::Status`.
pub(crate) async fn success_body(
    provider: ProviderId,
    res: reqwest::Response,
) -> Result<String, UpstreamFailure> {
    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| UpstreamFailure::Transport { provider, source })?;

    if !status.is_success() {
        return Err(UpstreamFailure::Status {
            provider,
            status,
            body: truncate_body(&body),
        });
    }

    Ok(body)
}

/// Parse a success body. Only non-JSON is rejected; the shape is not checked.
pub(crate) fn decode_body<T: DeserializeOwned>(
    provider: ProviderId,
    body: &str,
) -> Result<T, UpstreamFailure> {
    serde_json::from_str(body).map_err(|source| UpstreamFailure::Decode { provider, source })
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

pub(crate) fn trim_base_url(url: impl Into<String>) -> String {
    url.into().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn provider_id_accepts_aqi_alias() {
        assert_eq!(ProviderId::try_from("AQI").unwrap(), ProviderId::AirVisual);
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn failure_reports_its_provider() {
        let err = UpstreamFailure::Status {
            provider: ProviderId::AirVisual,
            status: StatusCode::TOO_MANY_REQUESTS,
            body: "slow down".into(),
        };

        assert_eq!(err.provider(), ProviderId::AirVisual);
        assert_eq!(
            err.to_string(),
            "airvisual request failed with status 429 Too Many Requests: slow down"
        );
    }

    #[test]
    fn decode_accepts_any_json_shape() {
        let reading: WeatherReading =
            decode_body(ProviderId::OpenWeather, r#"{"cod":200}"#).unwrap();
        assert_eq!(reading.temperature(), None);

        let err = decode_body::<WeatherReading>(ProviderId::OpenWeather, "<html>").unwrap_err();
        assert!(matches!(err, UpstreamFailure::Decode { .. }));
    }

    #[test]
    fn truncate_body_limits_long_bodies() {
        let long = "é".repeat(250);
        let out = truncate_body(&long);

        assert_eq!(out.chars().count(), 203);
        assert!(out.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn provider_set_builds_without_any_keys() {
        let set = ProviderSet::from_config(&Config::default());
        assert!(format!("{:?}", set.weather).contains("OpenWeatherProvider"));
    }
}
