//! Service configuration.
//!
//! Everything comes from the environment (a `.env` file is honored via
//! dotenvy in `main`), with defaults matching a local deployment:
//! `127.0.0.1:8000`, data files in the working directory, 15-minute
//! refresh period.

use std::path::PathBuf;
use std::time::Duration;

/// Seconds between refresh passes when `SKYWATCH_REFRESH_SECS` is unset
const DEFAULT_REFRESH_SECS: u64 = 900;

/// Default HTTP port
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub refresh_period: Duration,
}

impl Config {
    /// Read configuration from the environment, falling back to defaults.
    /// Unparseable values fall back rather than abort.
    pub fn from_env() -> Self {
        let host = std::env::var("SKYWATCH_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("SKYWATCH_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let data_dir = std::env::var("SKYWATCH_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let refresh_period = std::env::var("SKYWATCH_REFRESH_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_REFRESH_SECS));

        Self {
            host,
            port,
            data_dir,
            refresh_period,
        }
    }
}
