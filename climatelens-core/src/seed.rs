//! Fixed fallback payloads.
//!
//! One instance is built at startup and shared by the gateway (upstream
//! failure) and the dashboard (demo mode).

use serde_json::json;

use crate::model::{AirQualityReading, Coordinates, SummaryText, WeatherReading};

pub const SEED_CITY: &str = "London";
pub const SEED_COORDINATES: Coordinates = Coordinates {
    lat: 51.5074,
    lon: -0.1278,
};
pub const SEED_AQI: u32 = 42;

pub const DEMO_NARRATIVE: &str = "Today’s weather is clear with mild temperature and healthy \
air quality. It’s a great day for outdoor activities!";

#[derive(Debug, Clone, PartialEq)]
pub struct SeedRepository {
    weather: WeatherReading,
    air_quality: AirQualityReading,
    summary: SummaryText,
}

impl SeedRepository {
    pub fn weather(&self) -> &WeatherReading {
        &self.weather
    }

    pub fn air_quality(&self) -> &AirQualityReading {
        &self.air_quality
    }

    pub fn summary(&self) -> &SummaryText {
        &self.summary
    }

    /// Narrative shown when a summary is requested in demo mode.
    pub fn demo_narrative(&self) -> &str {
        self.summary.body()
    }
}

impl Default for SeedRepository {
    fn default() -> Self {
        Self {
            weather: WeatherReading::from_value(json!({
                "main": { "temp": 22, "humidity": 65 },
                "weather": [{ "description": "clear sky" }],
                "coord": { "lat": SEED_COORDINATES.lat, "lon": SEED_COORDINATES.lon },
            })),
            air_quality: AirQualityReading::new(SEED_CITY, SEED_AQI),
            summary: SummaryText::new(DEMO_NARRATIVE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_weather_is_clear_london() {
        let seed = SeedRepository::default();
        let weather = seed.weather();

        assert_eq!(weather.temperature(), Some(22.0));
        assert_eq!(weather.humidity(), Some(65));
        assert_eq!(weather.condition_description(), "clear sky");
        assert_eq!(
            weather.coordinates(),
            Some(Coordinates::new(51.5074, -0.1278))
        );
    }

    #[test]
    fn seed_weather_wire_shape() {
        let seed = SeedRepository::default();

        assert_eq!(
            serde_json::to_string(seed.weather()).unwrap(),
            r#"{"coord":{"lat":51.5074,"lon":-0.1278},"main":{"humidity":65,"temp":22},"weather":[{"description":"clear sky"}]}"#
        );
    }

    #[test]
    fn seed_air_quality_wire_shape() {
        let seed = SeedRepository::default();

        assert_eq!(
            seed.air_quality().as_value(),
            &json!({ "data": { "city": "London", "current": { "pollution": { "aqius": 42 } } } })
        );
    }

    #[test]
    fn demo_narrative_matches_seed_summary() {
        let seed = SeedRepository::default();
        assert_eq!(seed.demo_narrative(), seed.summary().body());
        assert!(
            seed.demo_narrative()
                .starts_with("Today’s weather is clear")
        );
    }
}
