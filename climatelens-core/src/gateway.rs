//! Aggregation gateway: one upstream attempt per call, seed payload on failure.

use std::sync::Arc;

use tracing::warn;

use crate::{
    Config,
    model::{AirQualityReading, Coordinates, SummaryText, WeatherReading},
    provider::{
        AirQualityProvider, ProviderSet, SummaryProvider, UpstreamFailure, WeatherProvider,
    },
    seed::SeedRepository,
};

#[derive(Debug, Clone)]
pub struct Gateway {
    weather: Arc<dyn WeatherProvider>,
    air_quality: Arc<dyn AirQualityProvider>,
    summary: Arc<dyn SummaryProvider>,
    seed: Arc<SeedRepository>,
}

impl Gateway {
    pub fn new(providers: ProviderSet, seed: Arc<SeedRepository>) -> Self {
        Self {
            weather: providers.weather,
            air_quality: providers.air_quality,
            summary: providers.summary,
            seed,
        }
    }

    pub fn from_config(config: &Config, seed: Arc<SeedRepository>) -> Self {
        Self::new(ProviderSet::from_config(config), seed)
    }

    pub fn seed(&self) -> &Arc<SeedRepository> {
        &self.seed
    }

    pub async fn get_weather(&self, city: &str) -> WeatherReading {
        match self.weather.current_weather(city).await {
            Ok(reading) => reading,
            Err(err) => {
                log_fallback("weather", &err);
                self.seed.weather().clone()
            }
        }
    }

    pub async fn get_air_quality(&self, coords: Coordinates) -> AirQualityReading {
        match self.air_quality.nearest_city(coords).await {
            Ok(reading) => reading,
            Err(err) => {
                log_fallback("air quality", &err);
                self.seed.air_quality().clone()
            }
        }
    }

    pub async fn get_summary(&self, text: &str) -> SummaryText {
        match self.summary.summarize(text).await {
            Ok(summary) => summary,
            Err(err) => {
                log_fallback("summary", &err);
                self.seed.summary().clone()
            }
        }
    }

    /// Seed air quality for requests that never reached a provider
    /// (e.g. coordinates that could not be parsed).
    pub fn air_quality_fallback(&self, reason: &str) -> AirQualityReading {
        warn!(reason = %reason, "Using seed air quality data");
        self.seed.air_quality().clone()
    }
}

fn log_fallback(kind: &str, err: &UpstreamFailure) {
    warn!(provider = %err.provider(), error = %err, "Using seed {kind} data");
}
