//! Access token claim decoding
//!
//! Access tokens are JWTs signed by the backend. The client never holds the
//! signing key, so it only reads the payload segment to learn the expiry and
//! privilege claims. The backend still verifies every request.

use crate::error::{SessionError, SessionResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Claims the session layer reads from an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Expiration time (as UTC timestamp)
    pub exp: i64,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
}

impl AccessClaims {
    /// Decode the payload segment of a JWT without verifying its signature
    pub fn decode(token: &str) -> SessionResult<Self> {
        let mut segments = token.split('.');
        let payload = match (segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(payload), Some(_)) if segments.next().is_none() => payload,
            _ => return Err(SessionError::invalid_token("expected three segments")),
        };

        // Some issuers keep the padding; the URL-safe alphabet is the same either way.
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| SessionError::invalid_token(format!("payload is not base64url: {e}")))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| SessionError::invalid_token(format!("malformed claims: {e}")))
    }

    /// Whether the token counts as expired at `now` (unix seconds).
    /// A negative leeway counts as zero.
    pub fn is_expired_at(&self, now: i64, leeway_secs: i64) -> bool {
        now.saturating_add(leeway_secs.max(0)) >= self.exp
    }

    /// Whether the token counts as expired right now
    pub fn is_expired(&self, leeway_secs: i64) -> bool {
        self.is_expired_at(Utc::now().timestamp(), leeway_secs)
    }
}

/// Build an unsigned token carrying the given claims, for tests and fixtures
pub fn encode_unsigned(claims: &AccessClaims) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap_or_default());
    format!("{header}.{payload}.signature")
}
