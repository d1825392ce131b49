//! Type-safe API clients that separate public and session-bound endpoints

use super::ClientError;
use reqwest::{Client, ClientBuilder};
use shelf_core::{ClientSettings, TokenStore};
use std::time::Duration;

/// Client for public endpoints that don't require authentication
#[derive(Clone)]
pub struct PublicShelfClient {
    client: Client,
    base_url: String,
}

/// Client for endpoints that require the signed-in user's access token.
///
/// Every request goes through the authenticated pipeline (see
/// [`AuthenticatedShelfClient::send`]).
#[derive(Clone)]
pub struct AuthenticatedShelfClient {
    pub(crate) public: PublicShelfClient,
    pub(crate) store: TokenStore,
}

impl PublicShelfClient {
    /// Create a new public client
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        TypedClientBuilder::new().base_url(base_url).build_public()
    }

    fn from_parts(
        base_url: &str,
        timeout: Option<Duration>,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        #[cfg(not(target_arch = "wasm32"))]
        let client = {
            let mut builder = ClientBuilder::new().user_agent(user_agent);
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            builder.build()?
        };

        #[cfg(target_arch = "wasm32")]
        let client = {
            let _ = timeout; // Timeouts not supported on WASM
            ClientBuilder::new().user_agent(user_agent).build()?
        };

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Create a request builder without authentication
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Execute a request and handle common errors
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        decode_response(response).await
    }

    /// Bind this client to a token store
    pub fn authenticate(self, store: TokenStore) -> AuthenticatedShelfClient {
        AuthenticatedShelfClient {
            public: self,
            store,
        }
    }
}

impl AuthenticatedShelfClient {
    /// Create a new authenticated client
    pub fn new(base_url: impl Into<String>, store: TokenStore) -> Result<Self, ClientError> {
        TypedClientBuilder::new()
            .base_url(base_url)
            .build_authenticated(store)
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.public.base_url()
    }

    /// The token store this client reads credentials from
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Create a request builder; the bearer token is attached when sent
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.public.request(method, path)
    }

    /// The public client (useful for calling public endpoints)
    pub fn public(&self) -> &PublicShelfClient {
        &self.public
    }
}

impl PartialEq for AuthenticatedShelfClient {
    fn eq(&self, other: &Self) -> bool {
        self.store.ptr_eq(&other.store) && self.base_url() == other.base_url()
    }
}

/// Map a response to its JSON body or a status error
pub(crate) async fn decode_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        // The server answered; a body that does not fit `T` is its fault, not the network's.
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    } else {
        let message = response.text().await.unwrap_or_else(|_| status.to_string());
        Err(ClientError::from_status(status, message))
    }
}

/// Type-safe builder that creates the appropriate client type
pub struct TypedClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: String,
}

impl TypedClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: None,
            user_agent: ClientSettings::default().user_agent,
        }
    }

    /// Start from loaded settings
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self {
            base_url: Some(settings.normalized_base_url().to_string()),
            timeout: settings.request_timeout_secs.map(Duration::from_secs),
            user_agent: settings.user_agent.clone(),
        }
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    #[cfg(not(target_arch = "wasm32"))]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build a public client
    pub fn build_public(self) -> Result<PublicShelfClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        PublicShelfClient::from_parts(&base_url, self.timeout, &self.user_agent)
    }

    /// Build a client bound to the given token store
    pub fn build_authenticated(
        self,
        store: TokenStore,
    ) -> Result<AuthenticatedShelfClient, ClientError> {
        Ok(self.build_public()?.authenticate(store))
    }
}

impl Default for TypedClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
