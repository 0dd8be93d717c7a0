//! User registry: registered users and their personal city lists.

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::{CityRef, User};
use crate::storage::{JsonStore, StorageError};

/// Document name under the data directory
const USERS_DOCUMENT: &str = "users";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Username {0:?} is already registered")]
    DuplicateUsername(String),

    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("City {city:?} not found for user {user_id}")]
    CityNotFound { user_id: i64, city: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

struct UsersInner {
    users: Vec<User>,
    next_id: i64,
}

pub struct UserRegistry {
    store: JsonStore,
    inner: Mutex<UsersInner>,
}

impl UserRegistry {
    /// Load the persisted registry. The id counter resumes from the max
    /// persisted id, so ids stay strictly increasing across restarts.
    pub fn load(store: JsonStore) -> Result<Self, StorageError> {
        let users: Vec<User> = store.load(USERS_DOCUMENT)?;
        let next_id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        info!(count = users.len(), next_id, "User registry loaded");
        Ok(Self {
            store,
            inner: Mutex::new(UsersInner { users, next_id }),
        })
    }

    /// Register a new user. Usernames are unique (exact match); persists on
    /// success and performs no mutation on failure.
    pub async fn register(&self, username: &str) -> Result<i64, UserError> {
        let mut inner = self.inner.lock().await;
        if inner.users.iter().any(|u| u.username == username) {
            return Err(UserError::DuplicateUsername(username.to_string()));
        }

        let id = inner.next_id;
        inner.next_id += 1;
        inner.users.push(User::new(id, username));
        self.store.save(USERS_DOCUMENT, &inner.users)?;
        info!(user_id = id, username, "User registered");
        Ok(id)
    }

    /// Append a city to a user's list and return the updated list.
    pub async fn add_city(&self, user_id: i64, city: CityRef) -> Result<Vec<CityRef>, UserError> {
        let mut inner = self.inner.lock().await;
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(UserError::UserNotFound(user_id))?;

        user.cities.push(city);
        let cities = user.cities.clone();
        self.store.save(USERS_DOCUMENT, &inner.users)?;
        Ok(cities)
    }

    /// Find a city on a user's list, for a direct weather lookup. This path
    /// bypasses the tracked-city cache entirely; the two city namespaces are
    /// independent.
    pub async fn city_for(&self, user_id: i64, city_name: &str) -> Result<CityRef, UserError> {
        let inner = self.inner.lock().await;
        let user = inner
            .users
            .iter()
            .find(|u| u.id == user_id)
            .ok_or(UserError::UserNotFound(user_id))?;

        user.city(city_name)
            .cloned()
            .ok_or_else(|| UserError::CityNotFound {
                user_id,
                city: city_name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> (tempfile::TempDir, UserRegistry) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonStore::new(dir.path()).expect("store");
        let registry = UserRegistry::load(store).expect("registry");
        (dir, registry)
    }

    fn nyc() -> CityRef {
        CityRef {
            city_name: "NYC".to_string(),
            latitude: 40.7,
            longitude: -74.0,
        }
    }

    #[tokio::test]
    async fn test_ids_are_strictly_increasing_from_one() {
        let (_dir, registry) = registry();
        assert_eq!(registry.register("alice").await.unwrap(), 1);
        assert_eq!(registry.register("bob").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected_without_mutation() {
        let (_dir, registry) = registry();
        registry.register("alice").await.unwrap();

        let result = registry.register("alice").await;
        assert!(matches!(result, Err(UserError::DuplicateUsername(_))));

        // The counter did not advance for the failed attempt
        assert_eq!(registry.register("bob").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_ids_never_reused_after_restart() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonStore::new(dir.path()).expect("store");
        {
            let registry = UserRegistry::load(store.clone()).expect("registry");
            registry.register("alice").await.unwrap();
            registry.register("bob").await.unwrap();
        }

        let reloaded = UserRegistry::load(store).expect("registry");
        assert_eq!(reloaded.register("carol").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_add_city_to_unknown_user_mutates_nothing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonStore::new(dir.path()).expect("store");
        let registry = UserRegistry::load(store.clone()).expect("registry");
        registry.register("alice").await.unwrap();

        let result = registry.add_city(99, nyc()).await;
        assert!(matches!(result, Err(UserError::UserNotFound(99))));

        let persisted: Vec<User> = store.load(USERS_DOCUMENT).unwrap();
        assert!(persisted[0].cities.is_empty());
    }

    #[tokio::test]
    async fn test_add_city_returns_updated_list() {
        let (_dir, registry) = registry();
        let id = registry.register("alice").await.unwrap();

        let cities = registry.add_city(id, nyc()).await.unwrap();
        assert_eq!(cities, vec![nyc()]);
    }

    #[tokio::test]
    async fn test_city_for_distinguishes_missing_user_and_city() {
        let (_dir, registry) = registry();
        let id = registry.register("alice").await.unwrap();
        registry.add_city(id, nyc()).await.unwrap();

        assert!(registry.city_for(id, "nyc").await.is_ok());
        assert!(matches!(
            registry.city_for(id, "Boston").await,
            Err(UserError::CityNotFound { .. })
        ));
        assert!(matches!(
            registry.city_for(42, "NYC").await,
            Err(UserError::UserNotFound(42))
        ));
    }
}
