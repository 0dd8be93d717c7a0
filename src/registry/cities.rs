//! Tracked-city registry: the shared list of cities with cached weather.

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{ApiError, WeatherClient};
use crate::models::{TrackedCity, WeatherSnapshot};
use crate::storage::{JsonStore, StorageError};

/// Document name under the data directory
const CITIES_DOCUMENT: &str = "tracked_cities";

/// Outcome of an add request. Re-adding a tracked name is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddCityOutcome {
    Added,
    AlreadyTracked,
}

pub struct CityRegistry {
    store: JsonStore,
    cities: Mutex<Vec<TrackedCity>>,
}

impl CityRegistry {
    /// Load the persisted registry; a missing document starts empty, a
    /// malformed one refuses to start.
    pub fn load(store: JsonStore) -> Result<Self, StorageError> {
        let cities: Vec<TrackedCity> = store.load(CITIES_DOCUMENT)?;
        info!(count = cities.len(), "Tracked-city registry loaded");
        Ok(Self {
            store,
            cities: Mutex::new(cities),
        })
    }

    /// Add a city unless a case-insensitive match already exists.
    /// Persists on success; idempotent by name.
    pub async fn add_city(
        &self,
        city_name: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<AddCityOutcome, StorageError> {
        let mut cities = self.cities.lock().await;
        if cities.iter().any(|c| c.matches_name(city_name)) {
            debug!(city = city_name, "Already tracked");
            return Ok(AddCityOutcome::AlreadyTracked);
        }

        cities.push(TrackedCity::new(city_name, latitude, longitude));
        self.store.save(CITIES_DOCUMENT, &cities)?;
        info!(city = city_name, "City added to tracking list");
        Ok(AddCityOutcome::Added)
    }

    /// Names of all tracked cities, in insertion order.
    pub async fn city_names(&self) -> Vec<String> {
        self.cities
            .lock()
            .await
            .iter()
            .map(|c| c.city_name.clone())
            .collect()
    }

    /// Case-insensitive lookup.
    pub async fn get(&self, city_name: &str) -> Option<TrackedCity> {
        self.cities
            .lock()
            .await
            .iter()
            .find(|c| c.matches_name(city_name))
            .cloned()
    }

    /// Cached snapshot if the refresher has populated one, otherwise a live
    /// fetch. The live result is deliberately not written back: only
    /// `refresh_all` populates the cache, so a freshly added city serves
    /// live lookups until the next pass.
    pub async fn weather_for(
        &self,
        city: &TrackedCity,
        client: &WeatherClient,
    ) -> Result<WeatherSnapshot, ApiError> {
        match city.weather {
            Some(ref snapshot) => Ok(snapshot.clone()),
            None => client.current_weather(city.latitude, city.longitude).await,
        }
    }

    /// One refresh pass: fetch fresh weather for every tracked city.
    ///
    /// Coordinates are snapshotted up front so the lock is never held across
    /// an upstream call; all updates are applied and persisted under a single
    /// re-acquisition at the end of the pass. A city whose fetch fails keeps
    /// its previous snapshot and does not abort the pass.
    pub async fn refresh_all(&self, client: &WeatherClient) -> Result<(), StorageError> {
        let targets: Vec<(String, f64, f64)> = self
            .cities
            .lock()
            .await
            .iter()
            .map(|c| (c.city_name.clone(), c.latitude, c.longitude))
            .collect();

        if targets.is_empty() {
            debug!("No tracked cities, skipping refresh pass");
            return Ok(());
        }

        let mut fetched: Vec<(String, WeatherSnapshot)> = Vec::with_capacity(targets.len());
        for (name, latitude, longitude) in targets {
            match client.current_weather(latitude, longitude).await {
                Ok(snapshot) => fetched.push((name, snapshot)),
                Err(e) => {
                    warn!(city = %name, error = %e, "Weather refresh failed, keeping previous snapshot");
                }
            }
        }

        let mut cities = self.cities.lock().await;
        let updated = fetched.len();
        for (name, snapshot) in fetched {
            if let Some(city) = cities.iter_mut().find(|c| c.matches_name(&name)) {
                city.weather = Some(snapshot);
            }
        }
        self.store.save(CITIES_DOCUMENT, &cities)?;
        info!(updated, total = cities.len(), "Refresh pass complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn registry() -> (tempfile::TempDir, CityRegistry) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonStore::new(dir.path()).expect("store");
        let registry = CityRegistry::load(store).expect("registry");
        (dir, registry)
    }

    async fn mock_client(server: &MockServer) -> WeatherClient {
        WeatherClient::with_base_url(format!("{}/v1/forecast", server.uri())).expect("client")
    }

    fn weather_response(temperature: f64) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current_weather": {"temperature": temperature, "windspeed": 1.0}
        }))
    }

    #[tokio::test]
    async fn test_add_city_is_idempotent_by_case_insensitive_name() {
        let (_dir, registry) = registry();

        let first = registry.add_city("New York", 40.7, -74.0).await.unwrap();
        let second = registry.add_city("NEW YORK", 40.7, -74.0).await.unwrap();

        assert_eq!(first, AddCityOutcome::Added);
        assert_eq!(second, AddCityOutcome::AlreadyTracked);
        assert_eq!(registry.city_names().await, ["New York"]);
    }

    #[tokio::test]
    async fn test_registry_survives_reload() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonStore::new(dir.path()).expect("store");
        {
            let registry = CityRegistry::load(store.clone()).expect("registry");
            registry.add_city("Oslo", 59.9, 10.7).await.unwrap();
            registry.add_city("Bergen", 60.4, 5.3).await.unwrap();
        }

        let reloaded = CityRegistry::load(store).expect("registry");
        assert_eq!(reloaded.city_names().await, ["Oslo", "Bergen"]);
    }

    #[tokio::test]
    async fn test_weather_for_prefers_cache_and_never_writes_it() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(weather_response(7.0))
            .mount(&server)
            .await;
        let client = mock_client(&server).await;

        let (_dir, registry) = registry();
        registry.add_city("Oslo", 59.9, 10.7).await.unwrap();

        // No cache yet: falls back to a live fetch...
        let city = registry.get("Oslo").await.unwrap();
        let live = registry.weather_for(&city, &client).await.unwrap();
        assert_eq!(live.temperature, Some(7.0));

        // ...which must not have populated the cache.
        let city = registry.get("Oslo").await.unwrap();
        assert!(city.weather.is_none());
    }

    #[tokio::test]
    async fn test_weather_for_returns_cached_snapshot_without_fetching() {
        // Unroutable client: any fetch attempt would error out
        let client = WeatherClient::with_base_url("http://127.0.0.1:1/v1/forecast").unwrap();

        let (_dir, registry) = registry();
        registry.add_city("Oslo", 59.9, 10.7).await.unwrap();
        {
            let mut cities = registry.cities.lock().await;
            cities[0].weather = Some(WeatherSnapshot {
                temperature: Some(3.0),
                wind_speed: None,
                pressure: None,
            });
        }

        let city = registry.get("Oslo").await.unwrap();
        let cached = registry.weather_for(&city, &client).await.unwrap();
        assert_eq!(cached.temperature, Some(3.0));
    }

    #[tokio::test]
    async fn test_refresh_all_continues_past_a_failing_city() {
        let server = MockServer::start().await;
        // Oslo succeeds, Bergen's coordinates 500
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "59.5"))
            .respond_with(weather_response(12.0))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "60.5"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let client = mock_client(&server).await;

        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonStore::new(dir.path()).expect("store");
        let registry = CityRegistry::load(store.clone()).expect("registry");
        registry.add_city("Oslo", 59.5, 10.5).await.unwrap();
        registry.add_city("Bergen", 60.5, 5.5).await.unwrap();

        registry.refresh_all(&client).await.unwrap();

        let oslo = registry.get("Oslo").await.unwrap();
        let bergen = registry.get("Bergen").await.unwrap();
        assert_eq!(oslo.weather.unwrap().temperature, Some(12.0));
        assert!(bergen.weather.is_none());

        // The persisted document is complete despite the partial failure
        let persisted: Vec<TrackedCity> = store.load(CITIES_DOCUMENT).unwrap();
        assert_eq!(persisted.len(), 2);
        assert!(persisted[0].weather.is_some());
    }
}
