//! Frontend configuration

use crate::storage::LocalStorage;
use shelf_core::{ClientSettings, TokenStore};
use shelf_http::{AuthenticatedShelfClient, ClientError, TypedClientBuilder};
use web_sys::window;

/// Get the base URL for API calls
fn get_base_url() -> String {
    // Try to get from window location
    if let Some(window) = window() {
        if let Ok(location) = window.location().origin() {
            return location;
        }
    }

    // Default to relative URLs
    String::new()
}

/// Settings for the browser build: same-origin backend, no client timeout
pub fn browser_settings() -> ClientSettings {
    ClientSettings {
        base_url: get_base_url(),
        request_timeout_secs: None,
        ..ClientSettings::default()
    }
}

/// Client whose session lives in `localStorage`
pub fn browser_client(settings: &ClientSettings) -> Result<AuthenticatedShelfClient, ClientError> {
    settings.validate()?;
    TypedClientBuilder::from_settings(settings).build_authenticated(TokenStore::new(LocalStorage))
}
