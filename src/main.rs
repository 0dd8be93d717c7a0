//! skywatch - a small weather tracking service.
//!
//! Proxies the Open-Meteo forecast API, keeps a registry of tracked cities
//! whose weather a background task refreshes periodically, and manages
//! registered users with their own city lists. State persists to two JSON
//! documents under the data directory.

mod api;
mod config;
mod http;
mod models;
mod refresher;
mod registry;
mod storage;

use std::io;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use api::WeatherClient;
use config::Config;
use http::AppState;
use refresher::Refresher;
use registry::{CityRegistry, UserRegistry};
use storage::JsonStore;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Config::from_env();
    info!(
        host = %config.host,
        port = config.port,
        data_dir = %config.data_dir.display(),
        "skywatch starting"
    );

    // A malformed document aborts startup here rather than silently losing data
    let store = JsonStore::new(&config.data_dir).context("Failed to prepare data directory")?;
    let cities =
        Arc::new(CityRegistry::load(store.clone()).context("Failed to load tracked cities")?);
    let users = Arc::new(UserRegistry::load(store).context("Failed to load users")?);
    let weather = WeatherClient::new().context("Failed to build weather client")?;

    let refresher = Refresher::spawn(
        Arc::clone(&cities),
        weather.clone(),
        config.refresh_period,
    );

    let state = web::Data::new(AppState {
        cities,
        users,
        weather,
    });
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(http::configure)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?
    .run();

    // Runs until SIGINT/SIGTERM triggers actix's graceful shutdown
    let result = server.await;

    refresher.shutdown().await;
    info!("skywatch shut down");

    result.map_err(Into::into)
}
