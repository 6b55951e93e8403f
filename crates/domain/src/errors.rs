//! Error types used throughout the client

use thiserror::Error;

/// Main error type for xauth operations
///
/// The authentication-flow variants (`AuthenticationFailed`, `RefreshFailed`)
/// are deliberately opaque: provider error text is logged where it occurs and
/// never carried in the returned error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Local precondition failure; no network call was made.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Provider answered with a non-2xx status.
    #[error("HTTP error {status}: {message}")]
    ProviderHttp { status: u16, message: String },

    /// Provider answered with 429.
    #[error("Rate limit exceeded (HTTP {status})")]
    RateLimited { status: u16 },

    /// Code exchange or refresh-and-retry flow failed.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Refresh grant failed or no refresh token was available.
    #[error("Token refresh failed")]
    RefreshFailed,

    /// Token revocation failed. Logged by logout, never returned from it.
    #[error("Token revocation failed: {0}")]
    RevocationFailed(String),

    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Transport(String),

    /// A response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Client configuration is invalid or incomplete.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// HTTP status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ProviderHttp { status, .. } | Self::RateLimited { status } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error terminates an authentication flow.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed | Self::RefreshFailed)
    }
}

/// Result type alias for xauth operations
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_messages() {
        assert_eq!(AuthError::AuthenticationFailed.to_string(), "Authentication failed");
        assert_eq!(AuthError::RefreshFailed.to_string(), "Token refresh failed");
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(AuthError::RateLimited { status: 429 }.status(), Some(429));
        assert_eq!(
            AuthError::ProviderHttp { status: 404, message: "Not Found".into() }.status(),
            Some(404)
        );
        assert_eq!(AuthError::AuthenticationFailed.status(), None);
    }

    #[test]
    fn test_auth_failure_classification() {
        assert!(AuthError::AuthenticationFailed.is_auth_failure());
        assert!(AuthError::RefreshFailed.is_auth_failure());
        assert!(!AuthError::RateLimited { status: 429 }.is_auth_failure());
    }
}
