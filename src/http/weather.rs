//! Weather lookup handlers: root, current conditions, and the
//! nearest-timestamp hourly lookup.

use actix_web::{error, get, web, HttpResponse};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::WeatherSnapshot;

use super::AppState;

/// Sentinel value for parameters the upstream returned no series for
const NO_DATA: &str = "no data";

/// Wire format for requested and echoed datetimes
const REQUEST_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[get("/")]
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Weather API Server is running" }))
}

#[derive(Debug, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

/// `GET /weather?latitude=..&longitude=..` — proxy the upstream current
/// conditions for arbitrary coordinates.
#[get("/weather")]
pub async fn current(
    state: web::Data<AppState>,
    query: web::Query<Coordinates>,
) -> actix_web::Result<web::Json<WeatherSnapshot>> {
    let snapshot = state
        .weather
        .current_weather(query.latitude, query.longitude)
        .await?;
    Ok(web::Json(snapshot))
}

/// `GET /weather_by_city_and_time?city_name=..&datetime_str=YYYY-MM-DD
/// HH:MM&parameters=..` — forecast values for a tracked city at the hourly
/// timestamp nearest the requested time.
///
/// `parameters` may be repeated and/or comma-separated.
#[get("/weather_by_city_and_time")]
pub async fn by_city_and_time(
    state: web::Data<AppState>,
    query: web::Query<Vec<(String, String)>>,
) -> actix_web::Result<HttpResponse> {
    let mut city_name = None;
    let mut datetime_str = None;
    let mut parameters: Vec<String> = Vec::new();
    for (key, value) in query.into_inner() {
        match key.as_str() {
            "city_name" => city_name = Some(value),
            "datetime_str" => datetime_str = Some(value),
            "parameters" => parameters.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from),
            ),
            _ => {}
        }
    }

    let city_name = city_name.ok_or_else(|| error::ErrorBadRequest("city_name is required"))?;
    let datetime_str =
        datetime_str.ok_or_else(|| error::ErrorBadRequest("datetime_str is required"))?;
    if parameters.is_empty() {
        return Err(error::ErrorBadRequest("parameters is required"));
    }

    let Some(city) = state.cities.get(&city_name).await else {
        return Ok(HttpResponse::Ok().json(json!({
            "error": format!("City {} is not in the tracking list.", city_name)
        })));
    };

    let requested = NaiveDateTime::parse_from_str(&datetime_str, REQUEST_TIME_FORMAT).map_err(
        |e| error::ErrorBadRequest(format!("Invalid datetime, expected YYYY-MM-DD HH:MM: {}", e)),
    )?;

    let forecast = state
        .weather
        .hourly_forecast(city.latitude, city.longitude, &parameters)
        .await?;
    let closest = forecast.closest_index(requested);

    let mut weather = serde_json::Map::new();
    for param in &parameters {
        let value = forecast
            .series
            .get(param)
            .and_then(|values| values.get(closest))
            .cloned()
            .unwrap_or_else(|| Value::String(NO_DATA.to_string()));
        weather.insert(param.clone(), value);
    }

    Ok(HttpResponse::Ok().json(json!({
        "city_name": city_name,
        "requested_datetime": requested.format(REQUEST_TIME_FORMAT).to_string(),
        "closest_time": forecast.timestamps[closest].format(REQUEST_TIME_FORMAT).to_string(),
        "weather": weather,
    })))
}
