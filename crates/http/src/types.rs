//! Request and response bodies of the marketplace user API

use serde::{Deserialize, Serialize};
use shelf_core::Session;

pub use shelf_core::UserProfile;

/// Credentials for `POST /user/login/`
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /user/register/`
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Credentials to sign in with once the account exists
    pub fn login(&self) -> LoginRequest {
        LoginRequest::new(&self.username, &self.password)
    }
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Tokens issued on login
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl From<TokenPair> for Session {
    fn from(pair: TokenPair) -> Self {
        Session::new(pair.access, pair.refresh)
    }
}

/// Body of `POST /user/token/refresh/`
#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Response of `POST /user/token/refresh/`
#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}
