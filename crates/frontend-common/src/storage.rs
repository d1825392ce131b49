//! Browser `localStorage` backend for the token store

use shelf_core::{SessionError, SessionResult, StorageBackend};
use web_sys::Storage;

/// Persists the session in the window's `localStorage` so it survives reloads
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }

    fn require() -> SessionResult<Storage> {
        Self::storage().ok_or_else(|| SessionError::storage("localStorage is unavailable"))
    }
}

impl StorageBackend for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> SessionResult<()> {
        Self::require()?
            .set_item(key, value)
            .map_err(|e| SessionError::storage(format!("failed to write {key}: {e:?}")))
    }

    fn remove(&self, key: &str) -> SessionResult<()> {
        Self::require()?
            .remove_item(key)
            .map_err(|e| SessionError::storage(format!("failed to remove {key}: {e:?}")))
    }
}
