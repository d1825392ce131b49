//! Session layer error types

/// Standard result type for session operations
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Errors raised by the client-side session layer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("No refresh token available")]
    MissingRefreshToken,

    #[error("Refresh rejected by server ({status}): {message}")]
    RefreshRejected { status: u16, message: String },

    #[error("Refresh request failed: {message}")]
    RefreshTransport { message: String },

    #[error("Invalid access token: {message}")]
    InvalidToken { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl SessionError {
    /// Create a refresh rejection error from a response status
    pub fn refresh_rejected(status: u16, message: impl Into<String>) -> Self {
        Self::RefreshRejected {
            status,
            message: message.into(),
        }
    }

    /// Create a transport error for a refresh call that never got a response
    pub fn refresh_transport(message: impl Into<String>) -> Self {
        Self::RefreshTransport {
            message: message.into(),
        }
    }

    /// Create an invalid token error
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether this failure is a network problem rather than a server verdict
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RefreshTransport { .. })
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}
