//! Persisted credential record: bearer token, refresh token and the cached
//! identity snapshot.

use std::sync::Arc;

use tracing::{debug, warn};

use super::models::AuthUser;
use crate::common::{KeyValueStore, StorageError};

pub const AUTH_TOKEN_KEY: &str = "talktolead_auth_token";
pub const REFRESH_TOKEN_KEY: &str = "talktolead_refresh_token";
pub const USER_KEY: &str = "talktolead_user";

#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.store.get(AUTH_TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    pub fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.store.set(AUTH_TOKEN_KEY, token)
    }

    pub fn clear_token(&self) -> Result<(), StorageError> {
        self.store.remove(AUTH_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    pub fn set_refresh_token(&self, token: &str) -> Result<(), StorageError> {
        self.store.set(REFRESH_TOKEN_KEY, token)
    }

    /// Last-known identity snapshot. Unparseable snapshots read as absent.
    /// Never authoritative on its own.
    pub fn cached_user(&self) -> Result<Option<AuthUser>, StorageError> {
        let Some(raw) = self.store.get(USER_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str::<AuthUser>(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "Ignoring unparseable cached user snapshot");
                Ok(None)
            }
        }
    }

    pub fn set_cached_user(&self, user: &AuthUser) -> Result<(), StorageError> {
        self.store.set(USER_KEY, &serde_json::to_string(user)?)
    }

    /// Removes the token, refresh token and identity snapshot
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(AUTH_TOKEN_KEY)?;
        self.store.remove(REFRESH_TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        debug!("Cleared persisted credentials");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::AuthRole;
    use crate::common::MemoryStore;

    #[test]
    fn test_round_trips_snapshot_and_clears_everything() {
        let backing = Arc::new(MemoryStore::new());
        let credentials = CredentialStore::new(backing.clone());

        credentials.set_token("tok").unwrap();
        credentials.set_refresh_token("refresh").unwrap();
        credentials
            .set_cached_user(&AuthUser::new("7", "rep@example.com", AuthRole::User))
            .unwrap();

        assert_eq!(credentials.token().unwrap().as_deref(), Some("tok"));
        assert_eq!(credentials.cached_user().unwrap().unwrap().id, "7");

        credentials.clear().unwrap();
        assert_eq!(credentials.token().unwrap(), None);
        assert_eq!(credentials.refresh_token().unwrap(), None);
        assert_eq!(backing.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_snapshot_reads_as_absent() {
        let backing = Arc::new(MemoryStore::new());
        backing.set(USER_KEY, "{not json").unwrap();

        let credentials = CredentialStore::new(backing);
        assert!(credentials.cached_user().unwrap().is_none());
    }
}
