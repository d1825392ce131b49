//! Client error types

use shelf_core::SessionError;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The access token expired and could not be renewed
    #[error("Session refresh failed: {0}")]
    RefreshFailed(#[source] SessionError),

    /// Reading or writing the stored session failed
    #[error("Session storage error: {0}")]
    Session(#[from] SessionError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored token cannot be sent as a header
    #[error("Invalid bearer token: {0}")]
    InvalidToken(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// HTTP status carried by the error, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::AuthenticationFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::ServerError { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Whether the caller should send the user back to the login page
    pub fn requires_login(&self) -> bool {
        self.is_unauthorized() || matches!(self, Self::RefreshFailed(_))
    }

    /// Translate a failed refresh call into the session layer's terms
    pub fn into_refresh_error(self) -> SessionError {
        match self {
            Self::Serialization(e) => SessionError::from(e),
            Self::Request(e) if e.is_decode() => SessionError::Serialization {
                message: e.to_string(),
            },
            Self::Request(e) if e.status().is_none() => SessionError::refresh_transport(e.to_string()),
            other => match other.status() {
                Some(status) => SessionError::refresh_rejected(status, other.to_string()),
                None => SessionError::refresh_transport(other.to_string()),
            },
        }
    }
}
