//! Domain models for tracked cities and cached weather.

use serde::{Deserialize, Serialize};

/// Cached current-weather reading for a tracked city.
///
/// Every field is individually optional: Open-Meteo's `current_weather`
/// block omits pressure entirely, and partial payloads must still be
/// representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: Option<f64>,
    pub wind_speed: Option<f64>,
    pub pressure: Option<f64>,
}

/// A city registered globally for periodic background weather refresh.
///
/// `weather` stays `None` until the first successful refresher pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedCity {
    pub city_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub weather: Option<WeatherSnapshot>,
}

impl TrackedCity {
    pub fn new(city_name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            city_name: city_name.into(),
            latitude,
            longitude,
            weather: None,
        }
    }

    /// Name comparison is case-insensitive throughout the registry.
    pub fn matches_name(&self, name: &str) -> bool {
        self.city_name.to_lowercase() == name.to_lowercase()
    }
}
