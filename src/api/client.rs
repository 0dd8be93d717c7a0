//! API client for the Open-Meteo forecast service.
//!
//! One `WeatherClient` is built at startup and shared; `reqwest::Client`
//! uses Arc internally so clones are cheap and share the connection pool.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::models::WeatherSnapshot;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the Open-Meteo forecast endpoint (no API key required)
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// HTTP request timeout in seconds.
/// Open-Meteo publishes no SLA; fail fast instead of hanging a request.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Timestamp format used by Open-Meteo hourly series
const UPSTREAM_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeatherRaw>,
}

/// Upstream `current_weather` block. All fields optional: Open-Meteo omits
/// pressure here, and the service's snapshot shape mirrors that.
#[derive(Debug, Default, Deserialize)]
struct CurrentWeatherRaw {
    temperature: Option<f64>,
    windspeed: Option<f64>,
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    #[serde(default)]
    time: Vec<String>,
    /// One value array per requested parameter, keyed by parameter name.
    #[serde(flatten)]
    series: HashMap<String, serde_json::Value>,
}

/// Hourly forecast: ordered timestamps plus one value series per parameter.
#[derive(Debug, Clone)]
pub struct HourlyForecast {
    pub timestamps: Vec<NaiveDateTime>,
    pub series: HashMap<String, Vec<serde_json::Value>>,
}

impl HourlyForecast {
    /// Index of the timestamp nearest the requested time.
    /// Equidistant ties resolve to the earlier timestamp.
    pub fn closest_index(&self, requested: NaiveDateTime) -> usize {
        self.timestamps
            .iter()
            .enumerate()
            .min_by_key(|(_, t)| (**t - requested).abs())
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

/// Client for the Open-Meteo forecast API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl WeatherClient {
    /// Create a client against the public Open-Meteo endpoint.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_base_url(FORECAST_URL)
    }

    /// Create a client against a different endpoint (tests point this at a
    /// mock server).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch current conditions for the given coordinates.
    ///
    /// A response without a `current_weather` block maps to a snapshot of
    /// nulls rather than an error, mirroring the upstream contract where
    /// individual readings may be absent.
    pub async fn current_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherSnapshot, ApiError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("latitude", latitude), ("longitude", longitude)])
            .query(&[("current_weather", "true")])
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let parsed: ForecastResponse = response.json().await?;

        let current = parsed.current_weather.unwrap_or_default();
        debug!(latitude, longitude, "Current weather fetched");

        Ok(WeatherSnapshot {
            temperature: current.temperature,
            wind_speed: current.windspeed,
            pressure: current.pressure,
        })
    }

    /// Fetch hourly series for all requested parameters in one round trip.
    pub async fn hourly_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        parameters: &[String],
    ) -> Result<HourlyForecast, ApiError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("latitude", latitude), ("longitude", longitude)])
            .query(&[
                ("hourly", parameters.join(",").as_str()),
                ("timezone", "auto"),
            ])
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let parsed: HourlyResponse = response.json().await?;

        let block = parsed.hourly.ok_or_else(|| {
            ApiError::InvalidResponse("hourly block missing from response".to_string())
        })?;
        if block.time.is_empty() {
            return Err(ApiError::InvalidResponse(
                "hourly timestamps missing from response".to_string(),
            ));
        }

        let timestamps = block
            .time
            .iter()
            .map(|t| NaiveDateTime::parse_from_str(t, UPSTREAM_TIME_FORMAT))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::InvalidResponse(format!("unparseable hourly timestamp: {}", e)))?;

        let series = block
            .series
            .into_iter()
            .filter_map(|(name, value)| match value {
                serde_json::Value::Array(values) => Some((name, values)),
                _ => None,
            })
            .collect();

        debug!(latitude, longitude, count = timestamps.len(), "Hourly forecast fetched");

        Ok(HourlyForecast { timestamps, series })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}
