//! User registration and per-user weather handlers.

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::models::{CityRef, WeatherSnapshot};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    username: String,
}

/// `POST /register_user {"username": ..}` — 400 on a taken username.
#[post("/register_user")]
pub async fn register_user(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> actix_web::Result<HttpResponse> {
    let username = body.into_inner().username;
    let user_id = state.users.register(&username).await?;
    Ok(HttpResponse::Ok().json(json!({ "user_id": user_id, "username": username })))
}

/// `POST /add_city/{user_id} {"city_name", "latitude", "longitude"}` —
/// append to the user's own city list; 404 on an unknown user.
#[post("/add_city/{user_id}")]
pub async fn add_user_city(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<CityRef>,
) -> actix_web::Result<HttpResponse> {
    let cities = state
        .users
        .add_city(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "City added.", "cities": cities })))
}

#[derive(Debug, Deserialize)]
pub struct CityNameQuery {
    city_name: String,
}

/// `GET /weather/{user_id}?city_name=..` — live weather for a city on the
/// user's list. Delegates straight to the upstream client; user cities
/// never touch the tracked-city cache.
#[get("/weather/{user_id}")]
pub async fn weather_for_user(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<CityNameQuery>,
) -> actix_web::Result<web::Json<WeatherSnapshot>> {
    let city = state
        .users
        .city_for(path.into_inner(), &query.city_name)
        .await?;
    let snapshot = state
        .weather
        .current_weather(city.latitude, city.longitude)
        .await?;
    Ok(web::Json(snapshot))
}
