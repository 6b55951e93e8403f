//! Wire types for the provider's OAuth endpoints

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Token endpoint response
///
/// The provider omits `refresh_token` when `offline.access` was not granted,
/// and may omit it on refresh when it does not rotate tokens.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Authorization redirect produced by `XAuthClient::authorization_url`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationUrl {
    /// Provider authorize URL with all query parameters
    pub url: Url,
    /// Anti-CSRF state embedded in `url`; the caller checks the echo
    pub state: String,
}

impl fmt::Display for AuthorizationUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
