//! Token store: the single owner of the persisted session
//!
//! Every read or write of the access token, refresh token and cached profile
//! goes through [`TokenStore`]. The durable medium is pluggable through
//! [`StorageBackend`] so tests run against memory and the browser build runs
//! against `localStorage`.

mod memory;

pub use memory::MemoryStorage;

use crate::config::AuthConfig;
use crate::error::{SessionError, SessionResult};
use crate::events::{SessionEvent, SessionEvents, SubscriptionId};
use crate::refresh::TokenRefresher;
use crate::session::{Session, UserProfile};
use futures::lock::Mutex as AsyncMutex;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Key/value medium the token store persists into
pub trait StorageBackend {
    /// Read a value; unavailable storage reads as absent
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> SessionResult<()>;
    fn remove(&self, key: &str) -> SessionResult<()>;
}

/// Shared handle to the persisted session.
///
/// Clones share the backend, the event listeners and the refresh lock.
#[derive(Clone)]
pub struct TokenStore {
    backend: Rc<dyn StorageBackend>,
    events: SessionEvents,
    refresh_lock: Rc<AsyncMutex<()>>,
}

impl TokenStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Rc::new(backend),
            events: SessionEvents::new(),
            refresh_lock: Rc::new(AsyncMutex::new(())),
        }
    }

    /// Store backed by process memory
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Persist both tokens of a freshly issued session
    pub fn save(&self, session: &Session) -> SessionResult<()> {
        self.backend
            .set(AuthConfig::ACCESS_TOKEN_KEY, &session.access_token)?;
        if let Err(e) = self
            .backend
            .set(AuthConfig::REFRESH_TOKEN_KEY, &session.refresh_token)
        {
            // Never leave the new access token paired with an older refresh token.
            warn!("Failed to store refresh token, dropping the partial session: {e}");
            self.clear();
            return Err(e);
        }
        debug!("Session saved");
        self.events.emit(&SessionEvent::SignedIn);
        Ok(())
    }

    /// Current tokens, or `None` unless both are present
    pub fn read(&self) -> Option<Session> {
        Some(Session {
            access_token: self.access_token()?,
            refresh_token: self.refresh_token()?,
        })
    }

    pub fn access_token(&self) -> Option<String> {
        self.backend
            .get(AuthConfig::ACCESS_TOKEN_KEY)
            .filter(|token| !token.is_empty())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.backend
            .get(AuthConfig::REFRESH_TOKEN_KEY)
            .filter(|token| !token.is_empty())
    }

    /// Replace the access token after a successful refresh
    pub fn set_access_token(&self, access_token: &str) -> SessionResult<()> {
        self.backend.set(AuthConfig::ACCESS_TOKEN_KEY, access_token)?;
        debug!("Access token replaced");
        self.events.emit(&SessionEvent::TokenRefreshed);
        Ok(())
    }

    /// Cache the user profile next to the session
    pub fn save_profile(&self, profile: &UserProfile) -> SessionResult<()> {
        let serialized = serde_json::to_string(profile)?;
        self.backend.set(AuthConfig::USER_KEY, &serialized)?;
        self.events
            .emit(&SessionEvent::ProfileUpdated(profile.clone()));
        Ok(())
    }

    /// Cached profile; a corrupt entry reads as absent
    pub fn profile(&self) -> Option<UserProfile> {
        let raw = self.backend.get(AuthConfig::USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!("Ignoring unreadable cached profile: {e}");
                None
            }
        }
    }

    /// Remove tokens and cached profile together and notify listeners.
    ///
    /// Listeners are expected to reset any in-memory state derived from the
    /// session.
    pub fn clear(&self) {
        for key in [
            AuthConfig::ACCESS_TOKEN_KEY,
            AuthConfig::REFRESH_TOKEN_KEY,
            AuthConfig::USER_KEY,
        ] {
            if let Err(e) = self.backend.remove(key) {
                warn!("Failed to remove {key} from storage: {e}");
            }
        }
        info!("Session cleared");
        self.events.emit(&SessionEvent::SignedOut);
    }

    pub fn subscribe(&self, listener: impl Fn(&SessionEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.events.unsubscribe(id);
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Refreshes are serialised across every clone of the store. `stale_access`
    /// is the access token the caller saw fail or expire; if a concurrent
    /// refresh already replaced it while this call waited, the replacement is
    /// returned without another network call.
    pub async fn refresh_with<R>(
        &self,
        refresher: &R,
        stale_access: Option<&str>,
    ) -> SessionResult<String>
    where
        R: TokenRefresher + ?Sized,
    {
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.access_token() {
            if stale_access != Some(current.as_str()) {
                debug!("Access token already refreshed by a concurrent caller");
                return Ok(current);
            }
        }

        let refresh_token = self
            .refresh_token()
            .ok_or(SessionError::MissingRefreshToken)?;

        debug!("Refreshing access token");
        let access_token = refresher.refresh_access_token(&refresh_token).await?;
        self.set_access_token(&access_token)?;
        info!("Access token refreshed");
        Ok(access_token)
    }

    /// Whether two handles share the same underlying store
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.refresh_lock, &other.refresh_lock)
    }
}
