//! Shelf session core
//!
//! Client-side session state for the marketplace frontend: the persisted
//! token store, access-token claim decoding, session events and the route
//! guard state machines. Network access is injected through
//! [`TokenRefresher`].

pub mod claims;
pub mod config;
pub mod error;
pub mod events;
pub mod guard;
pub mod refresh;
pub mod session;
pub mod store;

#[cfg(any(test, feature = "tests"))]
pub mod tests;

pub use claims::AccessClaims;
pub use config::{AuthConfig, ClientSettings};
pub use error::{SessionError, SessionResult};
pub use events::{SessionEvent, SessionEvents, SubscriptionId};
pub use guard::{AdminGuard, DenyReason, GuardDecision, GuardState, SessionGuard};
pub use refresh::TokenRefresher;
pub use session::{Session, UserProfile};
pub use store::{MemoryStorage, StorageBackend, TokenStore};
