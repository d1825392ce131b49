//! Authentication API client methods

use super::{
    error::ClientError,
    typed::{AuthenticatedShelfClient, PublicShelfClient},
};
use crate::types::{
    LoginRequest, RefreshRequest, RefreshResponse, RegisterRequest, TokenPair, UserProfile,
};
use async_trait::async_trait;
use reqwest::Method;
use shelf_core::{AuthConfig, Session, SessionResult, TokenRefresher};

/// Authentication endpoints for public client
impl PublicShelfClient {
    /// Exchange credentials for a token pair
    pub async fn login(&self, request: &LoginRequest) -> Result<TokenPair, ClientError> {
        let req = self
            .request(Method::POST, AuthConfig::LOGIN_PATH)
            .json(request);
        self.execute(req).await
    }

    /// Create an account
    pub async fn register(&self, request: &RegisterRequest) -> Result<UserProfile, ClientError> {
        let req = self
            .request(Method::POST, AuthConfig::REGISTER_PATH)
            .json(request);
        self.execute(req).await
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError> {
        let req = self
            .request(Method::POST, AuthConfig::REFRESH_PATH)
            .json(&RefreshRequest {
                refresh: refresh_token.to_string(),
            });
        self.execute(req).await
    }
}

#[async_trait(?Send)]
impl TokenRefresher for PublicShelfClient {
    async fn refresh_access_token(&self, refresh_token: &str) -> SessionResult<String> {
        self.refresh(refresh_token)
            .await
            .map(|response| response.access)
            .map_err(ClientError::into_refresh_error)
    }
}

/// Session lifecycle for authenticated client
impl AuthenticatedShelfClient {
    /// Get the signed-in user's profile (requires authentication)
    pub async fn profile(&self) -> Result<UserProfile, ClientError> {
        let request = self.request(Method::GET, AuthConfig::PROFILE_PATH);
        self.execute(request).await
    }

    /// Log in, persist the session and cache the user's profile
    pub async fn sign_in(&self, request: &LoginRequest) -> Result<UserProfile, ClientError> {
        let tokens = self.public.login(request).await?;
        self.store.save(&Session::from(tokens))?;
        info!("Signed in as {}", request.username);
        self.refresh_profile().await
    }

    /// Create an account, then sign in with the same credentials
    pub async fn register_and_sign_in(
        &self,
        request: &RegisterRequest,
    ) -> Result<UserProfile, ClientError> {
        let created = self.public.register(request).await?;
        debug!("Registered user {}", created.username);
        self.sign_in(&request.login()).await
    }

    /// Refetch the profile and update the cached copy
    pub async fn refresh_profile(&self) -> Result<UserProfile, ClientError> {
        let profile = self.profile().await?;
        self.store.save_profile(&profile)?;
        Ok(profile)
    }

    /// Drop the session; listeners on the store reset dependent state
    pub fn sign_out(&self) {
        self.store.clear();
    }
}
