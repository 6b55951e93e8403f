//! Provider profile payload and avatar URL normalization

use serde::Deserialize;
use xauth_domain::constants::NORMAL_IMAGE_MARKER;
use xauth_domain::{TokenPair, User};

/// `users/me` response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileEnvelope {
    pub data: ProviderProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderProfile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub profile_banner_url: Option<String>,
}

impl ProviderProfile {
    /// Merge the profile with a token pair into a session user record.
    pub fn into_user(self, tokens: TokenPair, normalizer: &dyn ProfileImageNormalizer) -> User {
        User {
            id: self.id,
            username: self.username,
            profile_image_url: self.profile_image_url.map(|url| normalizer.normalize(&url)),
            profile_banner_url: self.profile_banner_url,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

/// Rewrites the profile image URL stored on the user record
pub trait ProfileImageNormalizer: Send + Sync {
    fn normalize(&self, url: &str) -> String;
}

/// Removes the `_normal` size marker so the stored URL points at the
/// full-resolution image
#[derive(Debug, Clone, Copy, Default)]
pub struct StripSizeSuffix;

impl ProfileImageNormalizer for StripSizeSuffix {
    fn normalize(&self, url: &str) -> String {
        let (path, query) = match url.find(['?', '#']) {
            Some(idx) => url.split_at(idx),
            None => (url, ""),
        };
        let segment_start = path.rfind('/').map_or(0, |idx| idx + 1);
        let segment = &path[segment_start..];

        let Some(pos) = segment.rfind(NORMAL_IMAGE_MARKER) else {
            return url.to_string();
        };
        let rest = &segment[pos + NORMAL_IMAGE_MARKER.len()..];
        if !(rest.is_empty() || rest.starts_with('.')) {
            return url.to_string();
        }

        format!("{}{}{rest}{query}", &path[..segment_start], &segment[..pos])
    }
}

/// Leaves URLs untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNormalizer;

impl ProfileImageNormalizer for IdentityNormalizer {
    fn normalize(&self, url: &str) -> String {
        url.to_string()
    }
}
