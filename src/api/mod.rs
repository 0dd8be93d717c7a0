//! Client module for the Open-Meteo forecast API.
//!
//! Provides the `WeatherClient` for fetching current conditions and hourly
//! forecast series by coordinates. Open-Meteo requires no authentication.

pub mod client;
pub mod error;

pub use client::{HourlyForecast, WeatherClient};
pub use error::ApiError;
