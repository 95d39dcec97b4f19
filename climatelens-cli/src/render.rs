//! Plain-text cards for a dashboard snapshot.

use std::fmt;

use chrono::Local;
use climatelens_core::{Mode, Snapshot};

/// Renders a snapshot as the text dashboard.
pub struct SnapshotView<'a>(pub &'a Snapshot);

impl fmt::Display for SnapshotView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;

        writeln!(
            f,
            "== ClimateLens: {} ({} mode) ==",
            snapshot.city, snapshot.mode
        )?;

        match &snapshot.weather {
            Some(weather) => {
                writeln!(f, "[Weather]")?;
                writeln!(f, "  Temp: {} °C", or_na(weather.temperature()))?;
                writeln!(f, "  Condition: {}", weather.condition_description())?;
                writeln!(f, "  Humidity: {}%", or_na(weather.humidity()))?;
            }
            None => writeln!(f, "[Weather] no data yet")?,
        }

        if let Some(air_quality) = &snapshot.air_quality {
            writeln!(f, "[Air Quality]")?;
            writeln!(f, "  City: {}", or_na(air_quality.city_label()))?;
            writeln!(f, "  AQI: {}", or_na(air_quality.air_quality_index()))?;
        }

        if let Some(summary) = &snapshot.summary {
            writeln!(f, "[AI Summary]")?;
            writeln!(f, "  {summary}")?;
        }

        if let Some(at) = snapshot.updated_at {
            let local = at.with_timezone(&Local);
            writeln!(f, "Updated {}", local.format("%Y-%m-%d %H:%M:%S"))?;
        }

        if snapshot.mode == Mode::Demo {
            writeln!(f, "Demo mode active: showing seed London data.")?;
        }

        Ok(())
    }
}

pub fn snapshot(snapshot: &Snapshot) -> String {
    SnapshotView(snapshot).to_string()
}

fn or_na<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}
