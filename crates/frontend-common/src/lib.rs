//! Browser-side session layer for the Shelf marketplace frontend
//!
//! Wires the token store to `localStorage`, exposes the session through a
//! Yew context, and provides the `RequireSession` / `RequireAdmin` route
//! guards used by protected pages.

pub mod auth;
pub mod components;
pub mod config;
pub mod logging;
pub mod storage;

pub use auth::{RequireAdmin, RequireSession, SessionContext, SessionProvider};
pub use components::LoadingSpinner;
pub use config::{browser_client, browser_settings};
pub use logging::init_logging;
pub use storage::LocalStorage;
