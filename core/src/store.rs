//! Cached snapshot of the signed-in user.
//!
//! # Design
//! The cache is a convenience for the shell (show who is signed in without a
//! round-trip); `/api/me` stays the source of truth. It is overwritten on
//! login and `me`, and cleared on logout. A `UserStore` persists the
//! JSON-encoded snapshot under a fixed key.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::ApiError;
use crate::types::User;

pub const USER_STORAGE_KEY: &str = "currentUser";

/// Key/value persistence for string payloads.
pub trait UserStore {
    fn load(&self, key: &str) -> Result<Option<String>, ApiError>;
    fn save(&self, key: &str, value: &str) -> Result<(), ApiError>;
    fn remove(&self, key: &str) -> Result<(), ApiError>;
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileUserStore {
    dir: PathBuf,
}

impl FileUserStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl UserStore for FileUserStore {
    fn load(&self, key: &str) -> Result<Option<String>, ApiError> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ApiError::Storage(e.to_string())),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), ApiError> {
        fs::create_dir_all(&self.dir).map_err(|e| ApiError::Storage(e.to_string()))?;
        fs::write(self.path(key), value).map_err(|e| ApiError::Storage(e.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::Storage(e.to_string())),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryUserStore {
    fn load(&self, key: &str) -> Result<Option<String>, ApiError> {
        let entries = self.entries.lock().map_err(|e| ApiError::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let mut entries = self.entries.lock().map_err(|e| ApiError::Storage(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        let mut entries = self.entries.lock().map_err(|e| ApiError::Storage(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

/// The user snapshot, optionally backed by a store.
#[derive(Default)]
pub struct UserCache {
    user: Option<User>,
    store: Option<Box<dyn UserStore + Send + Sync>>,
}

impl UserCache {
    /// In-memory only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backed by `store`; a previously saved snapshot is loaded. Unreadable
    /// or corrupt snapshots load as "nobody signed in".
    pub fn with_store(store: Box<dyn UserStore + Send + Sync>) -> Self {
        let user = match store.load(USER_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring corrupt cached user");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "cached user unavailable");
                None
            }
        };
        Self {
            user,
            store: Some(store),
        }
    }

    pub fn get(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn set(&mut self, user: User) -> Result<(), ApiError> {
        if let Some(store) = &self.store {
            let raw = serde_json::to_string(&user).map_err(|e| ApiError::Serialization(e.to_string()))?;
            store.save(USER_STORAGE_KEY, &raw)?;
        }
        self.user = Some(user);
        Ok(())
    }

    /// The in-memory snapshot is dropped even if the store fails.
    pub fn clear(&mut self) -> Result<(), ApiError> {
        self.user = None;
        match &self.store {
            Some(store) => store.remove(USER_STORAGE_KEY),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for UserCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCache")
            .field("user", &self.user)
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        serde_json::from_str(r#"{"id":1,"email":"anna@firma.pl","role":"ROLE_MANAGER"}"#).unwrap()
    }

    #[test]
    fn memory_cache_roundtrip() {
        let mut cache = UserCache::new();
        assert!(cache.get().is_none());
        cache.set(user()).unwrap();
        assert_eq!(cache.get().unwrap().email, "anna@firma.pl");
        cache.clear().unwrap();
        assert!(cache.get().is_none());
    }

    #[test]
    fn file_store_persists_across_caches() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = UserCache::with_store(Box::new(FileUserStore::new(dir.path())));
        cache.set(user()).unwrap();
        assert!(dir.path().join("currentUser.json").exists());

        let reloaded = UserCache::with_store(Box::new(FileUserStore::new(dir.path())));
        assert_eq!(reloaded.get(), Some(&user()));

        let mut reloaded = reloaded;
        reloaded.clear().unwrap();
        assert!(!dir.path().join("currentUser.json").exists());
        // Clearing twice is fine.
        reloaded.clear().unwrap();
    }

    #[test]
    fn corrupt_snapshot_loads_as_none() {
        let store = MemoryUserStore::new();
        store.save(USER_STORAGE_KEY, "{not json").unwrap();
        let cache = UserCache::with_store(Box::new(store));
        assert!(cache.get().is_none());
    }
}
