//! Reading shapes shared by providers, the gateway and the dashboard.
//!
//! Weather and air-quality readings hold the upstream JSON body as received,
//! so a live response is handed back without any rewriting. Accessors read
//! the fields the dashboard needs and tolerate their absence.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Geographic position used to link a weather reading to an air-quality lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Current weather for a city, in the OpenWeather "current weather" layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherReading(Value);

impl WeatherReading {
    pub fn new(
        temperature_c: f64,
        humidity_pct: u8,
        description: impl Into<String>,
        coord: Option<Coordinates>,
    ) -> Self {
        let mut body = json!({
            "main": { "temp": temperature_c, "humidity": humidity_pct },
            "weather": [{ "description": description.into() }],
        });
        if let Some(coord) = coord {
            body["coord"] = json!({ "lat": coord.lat, "lon": coord.lon });
        }
        Self(body)
    }

    pub fn from_value(body: Value) -> Self {
        Self(body)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Temperature in °C.
    pub fn temperature(&self) -> Option<f64> {
        self.0.pointer("/main/temp").and_then(Value::as_f64)
    }

    /// Relative humidity, 0..=100.
    pub fn humidity(&self) -> Option<u8> {
        self.0
            .pointer("/main/humidity")
            .and_then(Value::as_f64)
            .map(|h| h.round().clamp(0.0, 100.0) as u8)
    }

    pub fn condition_description(&self) -> &str {
        self.0
            .pointer("/weather/0/description")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        let coord = self.0.get("coord")?;
        let lat = coord.get("lat")?.as_f64()?;
        let lon = coord.get("lon")?.as_f64()?;
        Some(Coordinates::new(lat, lon))
    }
}

/// Air quality near a coordinate, in the AirVisual "nearest city" layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AirQualityReading(Value);

impl AirQualityReading {
    pub fn new(city: impl Into<String>, aqius: u32) -> Self {
        Self(json!({
            "data": {
                "city": city.into(),
                "current": { "pollution": { "aqius": aqius } },
            }
        }))
    }

    pub fn from_value(body: Value) -> Self {
        Self(body)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn city_label(&self) -> Option<&str> {
        self.0.pointer("/data/city").and_then(Value::as_str)
    }

    /// US AQI.
    pub fn air_quality_index(&self) -> Option<u32> {
        self.0
            .pointer("/data/current/pollution/aqius")
            .and_then(Value::as_u64)
            .and_then(|aqi| u32::try_from(aqi).ok())
    }
}

/// Generated narrative about the current readings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryText {
    pub summary: String,
}

impl SummaryText {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
        }
    }

    pub fn body(&self) -> &str {
        &self.summary
    }
}
