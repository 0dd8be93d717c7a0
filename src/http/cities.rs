//! Tracked-city handlers.
//!
//! This namespace keeps the service's original response convention:
//! unknown cities answer with a message body, not a 404.

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::registry::AddCityOutcome;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct AddCityQuery {
    city_name: String,
    latitude: f64,
    longitude: f64,
}

/// `POST /add_city?city_name=..&latitude=..&longitude=..`
#[post("/add_city")]
pub async fn add_city(
    state: web::Data<AppState>,
    query: web::Query<AddCityQuery>,
) -> actix_web::Result<HttpResponse> {
    let AddCityQuery {
        city_name,
        latitude,
        longitude,
    } = query.into_inner();

    let outcome = state.cities.add_city(&city_name, latitude, longitude).await?;
    let message = match outcome {
        AddCityOutcome::Added => format!("{} was added to the tracking list.", city_name),
        AddCityOutcome::AlreadyTracked => format!("{} is already being tracked.", city_name),
    };
    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

/// `GET /tracked_cities`
#[get("/tracked_cities")]
pub async fn tracked_cities(state: web::Data<AppState>) -> HttpResponse {
    let names = state.cities.city_names().await;
    if names.is_empty() {
        HttpResponse::Ok().json(json!({ "message": "No cities are being tracked." }))
    } else {
        HttpResponse::Ok().json(json!({ "tracked_cities": names }))
    }
}

/// `GET /tracked_cities/{city_name}` — cached weather if the refresher has
/// run, otherwise a live lookup (which does not populate the cache).
#[get("/tracked_cities/{city_name}")]
pub async fn tracked_city(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> actix_web::Result<HttpResponse> {
    let city_name = path.into_inner();
    let Some(city) = state.cities.get(&city_name).await else {
        return Ok(HttpResponse::Ok().json(json!({
            "message": format!("City {} is not in the tracking list.", city_name)
        })));
    };

    let weather = state.cities.weather_for(&city, &state.weather).await?;
    Ok(HttpResponse::Ok().json(json!({
        "city_name": city.city_name,
        "latitude": city.latitude,
        "longitude": city.longitude,
        "weather": weather,
    })))
}
