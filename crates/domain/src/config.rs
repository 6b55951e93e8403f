//! Client configuration

use std::fmt;

use url::Url;

use crate::constants::{API_BASE_URL, AUTH_URL};
use crate::errors::{AuthError, Result};

/// Immutable OAuth client configuration
///
/// Built once at client construction and never mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret, sent only inside the Basic authorization header
    pub client_secret: String,

    /// Redirect URI registered with the provider
    pub redirect_uri: String,

    /// Base URL for API endpoints (always ends with `/`)
    pub api_base_url: Url,

    /// Authorization endpoint the user's browser is sent to
    pub authorize_url: Url,
}

impl ClientConfig {
    /// Create a configuration against the provider's production endpoints.
    ///
    /// # Errors
    /// Returns `AuthError::Config` if any credential is empty.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self> {
        Self::with_endpoints(client_id, client_secret, redirect_uri, API_BASE_URL, AUTH_URL)
    }

    /// Create a configuration with explicit API base and authorize URLs.
    ///
    /// A missing trailing slash on `api_base_url` is added so that relative
    /// endpoints resolve beneath it rather than replacing its last segment.
    ///
    /// # Errors
    /// Returns `AuthError::Config` if a credential is empty or a URL does not
    /// parse.
    pub fn with_endpoints(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        api_base_url: &str,
        authorize_url: &str,
    ) -> Result<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();
        let redirect_uri = redirect_uri.into();

        for (name, value) in [
            ("client_id", &client_id),
            ("client_secret", &client_secret),
            ("redirect_uri", &redirect_uri),
        ] {
            if value.trim().is_empty() {
                return Err(AuthError::Config(format!("{name} must not be empty")));
            }
        }

        let base = if api_base_url.ends_with('/') {
            api_base_url.to_string()
        } else {
            format!("{api_base_url}/")
        };
        let api_base_url = Url::parse(&base)
            .map_err(|e| AuthError::Config(format!("Invalid API base URL '{base}': {e}")))?;
        let authorize_url = Url::parse(authorize_url).map_err(|e| {
            AuthError::Config(format!("Invalid authorize URL '{authorize_url}': {e}"))
        })?;

        Ok(Self { client_id, client_secret, redirect_uri, api_base_url, authorize_url })
    }

    /// Resolve an endpoint against the API base URL.
    ///
    /// A leading `/` is ignored so that `"/users/me"` and `"users/me"`
    /// resolve identically. Absolute URLs are accepted only when they already
    /// point beneath the API base, so the bearer token never leaves it.
    ///
    /// # Errors
    /// Returns `AuthError::InvalidRequest` if the endpoint cannot be joined or
    /// resolves outside the API base URL.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let invalid = |reason: String| {
            AuthError::InvalidRequest(format!("Invalid endpoint '{endpoint}': {reason}"))
        };

        let lower = endpoint.to_ascii_lowercase();
        let url = if lower.starts_with("http://") || lower.starts_with("https://") {
            Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?
        } else {
            // `./` keeps a first segment containing `:` from parsing as a scheme
            let relative = format!("./{}", endpoint.trim_start_matches('/'));
            self.api_base_url.join(&relative).map_err(|e| invalid(e.to_string()))?
        };

        if !url.as_str().starts_with(self.api_base_url.as_str()) {
            return Err(invalid("outside the API base URL".to_string()));
        }
        Ok(url)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("api_base_url", &self.api_base_url.as_str())
            .field("authorize_url", &self.authorize_url.as_str())
            .finish()
    }
}
