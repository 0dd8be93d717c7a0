//! HTTP surface of the service.
//!
//! Thin glue over the registries and the weather client: handlers validate
//! input, call the owning component, and shape the JSON response. All
//! shared state is injected through `AppState`.

pub mod cities;
pub mod error;
pub mod users;
pub mod weather;

use std::sync::Arc;

use actix_web::web;

use crate::api::WeatherClient;
use crate::registry::{CityRegistry, UserRegistry};

/// Shared state handed to every handler via `web::Data`.
pub struct AppState {
    pub cities: Arc<CityRegistry>,
    pub users: Arc<UserRegistry>,
    pub weather: WeatherClient,
}

/// Register all routes on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(weather::root)
        .service(weather::current)
        .service(weather::by_city_and_time)
        .service(cities::add_city)
        .service(cities::tracked_cities)
        .service(cities::tracked_city)
        .service(users::register_user)
        .service(users::add_user_city)
        .service(users::weather_for_user);
}
