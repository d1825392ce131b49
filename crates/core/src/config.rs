//! Client configuration

use crate::error::{SessionError, SessionResult};
use serde::{Deserialize, Serialize};

/// Fixed names shared by the session layer
pub struct AuthConfig;

impl AuthConfig {
    /// Storage key for the access token
    pub const ACCESS_TOKEN_KEY: &'static str = "ACCESS_TOKEN";
    /// Storage key for the refresh token
    pub const REFRESH_TOKEN_KEY: &'static str = "REFRESH_TOKEN";
    /// Storage key for the cached user profile
    pub const USER_KEY: &'static str = "USER";

    pub const LOGIN_PATH: &'static str = "/user/login/";
    pub const REGISTER_PATH: &'static str = "/user/register/";
    pub const REFRESH_PATH: &'static str = "/user/token/refresh/";
    pub const PROFILE_PATH: &'static str = "/user/profile/";

    /// Route unauthenticated visitors are sent to
    pub const LOGIN_ROUTE: &'static str = "/login";
    /// Route insufficiently privileged visitors are sent to
    pub const HOME_ROUTE: &'static str = "/";

    pub const LOGIN_MESSAGE: &'static str = "Please log in to continue.";
    pub const NOT_AUTHORIZED_MESSAGE: &'static str = "not authorized";
    pub const ADMIN_ONLY_MESSAGE: &'static str = "must be admin";
}

/// Runtime settings for the API client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Backend origin, without trailing slash. Empty means same origin.
    pub base_url: String,
    /// Per-request timeout in seconds (ignored in the browser)
    pub request_timeout_secs: Option<u64>,
    pub user_agent: String,
    /// Seconds before `exp` at which an access token already counts as expired
    pub expiry_leeway_secs: i64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            request_timeout_secs: Some(30),
            user_agent: format!("shelf-client/{}", env!("CARGO_PKG_VERSION")),
            expiry_leeway_secs: 0,
        }
    }
}

impl ClientSettings {
    /// Settings pointing at the given backend origin
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Parse settings from a JSON document, filling unspecified fields with defaults
    pub fn from_json(raw: &str) -> SessionResult<Self> {
        let settings: Self = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> SessionResult<()> {
        if self.expiry_leeway_secs < 0 {
            return Err(SessionError::invalid_config(
                "expiry_leeway_secs must not be negative",
            ));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(SessionError::invalid_config(
                "request_timeout_secs must be positive",
            ));
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
