//! Dashboard controller.
//!
//! Sequences the weather → air-quality lookup for the selected city, holds
//! the last readings for rendering, and produces a summary on request. In
//! demo mode everything resolves to the seed repository without any calls.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    gateway::Gateway,
    model::{AirQualityReading, Coordinates, SummaryText, WeatherReading},
    seed::{SEED_CITY, SeedRepository},
};

/// Read side the dashboard goes through: the in-process gateway or its HTTP surface.
#[async_trait]
pub trait ClimateApi: Send + Sync {
    async fn get_weather(&self, city: &str) -> anyhow::Result<WeatherReading>;
    async fn get_air_quality(&self, coords: Coordinates) -> anyhow::Result<AirQualityReading>;
    async fn get_summary(&self, text: &str) -> anyhow::Result<SummaryText>;
}

#[async_trait]
impl ClimateApi for Gateway {
    async fn get_weather(&self, city: &str) -> anyhow::Result<WeatherReading> {
        Ok(Gateway::get_weather(self, city).await)
    }

    async fn get_air_quality(&self, coords: Coordinates) -> anyhow::Result<AirQualityReading> {
        Ok(Gateway::get_air_quality(self, coords).await)
    }

    async fn get_summary(&self, text: &str) -> anyhow::Result<SummaryText> {
        Ok(Gateway::get_summary(self, text).await)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Live,
    Demo,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Live => "live",
            Mode::Demo => "demo",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Mode::Live => Mode::Demo,
            Mode::Demo => Mode::Live,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the dashboard currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub mode: Mode,
    pub city: String,
    pub weather: Option<WeatherReading>,
    pub air_quality: Option<AirQualityReading>,
    pub summary: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct State {
    snapshot: Snapshot,
    // Bumped at the start of every refresh / summary request; a response is
    // applied only if its tag is still the current one.
    generation: u64,
    summary_generation: u64,
}

pub struct Dashboard<A> {
    api: A,
    seed: Arc<SeedRepository>,
    state: Mutex<State>,
}

impl<A: ClimateApi> Dashboard<A> {
    pub fn new(api: A, seed: Arc<SeedRepository>) -> Self {
        Self {
            api,
            seed,
            state: Mutex::new(State {
                snapshot: Snapshot {
                    mode: Mode::Live,
                    city: SEED_CITY.to_string(),
                    weather: None,
                    air_quality: None,
                    summary: None,
                    updated_at: None,
                },
                generation: 0,
                summary_generation: 0,
            }),
        }
    }

    /// Initial city, without fetching anything.
    pub fn with_city(self, city: impl Into<String>) -> Self {
        self.lock().snapshot.city = city.into();
        self
    }

    /// Initial mode, without fetching anything.
    pub fn with_mode(self, mode: Mode) -> Self {
        self.lock().snapshot.mode = mode;
        self
    }

    pub fn mode(&self) -> Mode {
        self.lock().snapshot.mode
    }

    pub fn city(&self) -> String {
        self.lock().snapshot.city.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot.clone()
    }

    pub async fn set_mode(&self, mode: Mode) {
        self.lock().snapshot.mode = mode;
        self.refresh().await;
    }

    pub async fn toggle_mode(&self) -> Mode {
        let mode = {
            let mut state = self.lock();
            state.snapshot.mode = state.snapshot.mode.toggled();
            state.snapshot.mode
        };
        self.refresh().await;
        mode
    }

    pub async fn set_city(&self, city: impl Into<String>) {
        self.lock().snapshot.city = city.into();
        self.refresh().await;
    }

    /// Re-run the weather → air-quality sequence for the current city.
    pub async fn refresh(&self) {
        let (generation, mode, city) = {
            let mut state = self.lock();
            state.generation += 1;
            (
                state.generation,
                state.snapshot.mode,
                state.snapshot.city.clone(),
            )
        };

        if mode == Mode::Demo {
            let weather = self.seed.weather().clone();
            let air_quality = self.seed.air_quality().clone();
            self.apply(generation, |snapshot| {
                snapshot.weather = Some(weather);
                snapshot.air_quality = Some(air_quality);
            });
            return;
        }

        let weather = match self.api.get_weather(&city).await {
            Ok(weather) => weather,
            Err(err) => {
                warn!(
                    city = %city,
                    error = %err,
                    "Weather request failed; keeping previous readings"
                );
                return;
            }
        };

        let coords = weather.coordinates();
        if !self.apply(generation, |snapshot| snapshot.weather = Some(weather)) {
            return;
        }

        let Some(coords) = coords else {
            debug!(city = %city, "Weather reading has no coordinates; skipping air quality");
            return;
        };

        match self.api.get_air_quality(coords).await {
            Ok(air_quality) => {
                self.apply(generation, |snapshot| snapshot.air_quality = Some(air_quality));
            }
            Err(err) => {
                warn!(
                    city = %city,
                    error = %err,
                    "Air quality request failed; keeping previous reading"
                );
            }
        }
    }

    /// Summarize the readings currently held. Returns the new summary, or
    /// `None` if the request failed or was overtaken by a newer one.
    pub async fn generate_summary(&self) -> Option<String> {
        let (generation, mode, text) = {
            let mut state = self.lock();
            state.summary_generation += 1;
            let text = summary_input(
                state.snapshot.weather.as_ref(),
                state.snapshot.air_quality.as_ref(),
            );
            (state.summary_generation, state.snapshot.mode, text)
        };

        let summary = match mode {
            Mode::Demo => self.seed.demo_narrative().to_string(),
            Mode::Live => match self.api.get_summary(&text).await {
                Ok(summary) => summary.summary,
                Err(err) => {
                    warn!(error = %err, "Summary request failed");
                    return None;
                }
            },
        };

        let mut state = self.lock();
        if state.summary_generation != generation {
            debug!(generation = generation, "Discarding stale summary");
            return None;
        }
        state.snapshot.summary = Some(summary.clone());
        Some(summary)
    }

    fn apply(&self, generation: u64, update: impl FnOnce(&mut Snapshot)) -> bool {
        let mut state = self.lock();
        if state.generation != generation {
            debug!(
                generation = generation,
                current = state.generation,
                "Discarding stale response"
            );
            return false;
        }
        update(&mut state.snapshot);
        state.snapshot.updated_at = Some(Utc::now());
        true
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Text blob sent for summarization: both readings as JSON, `null` when absent.
pub fn summary_input(
    weather: Option<&WeatherReading>,
    air_quality: Option<&AirQualityReading>,
) -> String {
    format!(
        "Weather: {}, Air Quality: {}",
        to_json(&weather),
        to_json(&air_quality)
    )
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}
