//! Domain models for registered users and their city lists.

use serde::{Deserialize, Serialize};

/// A city on a user's personal list.
///
/// Deliberately independent of the tracked-city registry: a user's cities
/// carry their own coordinates and never share the registry's weather cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRef {
    pub city_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A registered user. Ids are assigned monotonically and never reused,
/// even across restarts (derived from the max persisted id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub cities: Vec<CityRef>,
}

impl User {
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            cities: Vec::new(),
        }
    }

    /// Case-insensitive lookup on the user's own city list.
    pub fn city(&self, name: &str) -> Option<&CityRef> {
        self.cities
            .iter()
            .find(|c| c.city_name.to_lowercase() == name.to_lowercase())
    }
}
