//! Provider constants
//!
//! Fixed endpoints, scopes and profile fields for the X (Twitter) API v2.

/// Base URL every API endpoint is resolved against. Must end with `/`.
pub const API_BASE_URL: &str = "https://api.twitter.com/2/";

/// Browser-facing authorization endpoint.
pub const AUTH_URL: &str = "https://twitter.com/i/oauth2/authorize";

/// Token endpoint, relative to [`API_BASE_URL`].
pub const TOKEN_ENDPOINT: &str = "oauth2/token";

/// Revocation endpoint, relative to [`API_BASE_URL`].
pub const REVOKE_ENDPOINT: &str = "oauth2/revoke";

/// Authenticated user's profile endpoint, relative to [`API_BASE_URL`].
pub const PROFILE_ENDPOINT: &str = "users/me";

/// Permission scopes requested on every authorization.
pub const SCOPES: &[&str] = &["tweet.read", "users.read", "offline.access"];

/// Profile fields requested from [`PROFILE_ENDPOINT`].
pub const PROFILE_FIELDS: &[&str] = &["profile_image_url", "profile_banner_url"];

/// Query parameter carrying [`PROFILE_FIELDS`].
pub const PROFILE_FIELDS_PARAM: &str = "user.fields";

/// Filename marker the provider uses for its downsized avatar variant.
pub const NORMAL_IMAGE_MARKER: &str = "_normal";

/// Space-joined scope string as sent in the authorization URL.
#[must_use]
pub fn scope_string() -> String {
    SCOPES.join(" ")
}
