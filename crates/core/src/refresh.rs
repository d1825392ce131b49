//! Token refresh seam

use crate::error::SessionResult;
use async_trait::async_trait;

/// Exchanges a refresh token for a new access token.
///
/// Implemented by the HTTP client against the backend's refresh endpoint.
/// Implementations only perform the exchange; storing the result is the
/// token store's job.
#[async_trait(?Send)]
pub trait TokenRefresher {
    async fn refresh_access_token(&self, refresh_token: &str) -> SessionResult<String>;
}
