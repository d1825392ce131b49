//! Authenticated request pipeline
//!
//! Attaches the stored access token to outgoing requests and recovers from a
//! single expired-token rejection by refreshing once and resending once.

use super::typed::{decode_response, AuthenticatedShelfClient};
use super::ClientError;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response, StatusCode};
use shelf_core::SessionError;

impl AuthenticatedShelfClient {
    /// Send a request through the pipeline and return the raw response.
    ///
    /// Error statuses other than a recoverable 401 are returned as responses;
    /// use [`execute`](Self::execute) to map them to [`ClientError`].
    pub async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, ClientError> {
        let mut request = request.build()?;
        let sent_token = self.store.access_token();
        if let Some(token) = &sent_token {
            attach_bearer(&mut request, token)?;
        }

        // Streaming bodies cannot be replayed, so such requests get no retry.
        let retry = request.try_clone();
        let response = self.public.http().execute(request).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        let Some(mut retry) = retry else {
            debug!("401 on a request that cannot be replayed; not refreshing");
            return Ok(response);
        };

        let access_token = match self
            .store
            .refresh_with(&self.public, sent_token.as_deref())
            .await
        {
            Ok(token) => token,
            Err(SessionError::MissingRefreshToken) => {
                debug!("401 with no refresh token stored; returning original response");
                return Ok(response);
            }
            Err(e) => {
                warn!("Access token refresh failed: {e}");
                return Err(ClientError::RefreshFailed(e));
            }
        };

        attach_bearer(&mut retry, &access_token)?;
        debug!("Retrying {} {} with refreshed token", retry.method(), retry.url());
        Ok(self.public.http().execute(retry).await?)
    }

    /// Send a request through the pipeline and decode its JSON body
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        decode_response(response).await
    }
}

fn attach_bearer(request: &mut Request, token: &str) -> Result<(), ClientError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| ClientError::InvalidToken(e.to_string()))?;
    value.set_sensitive(true);
    request.headers_mut().insert(AUTHORIZATION, value);
    Ok(())
}
