//! User and token types
//!
//! The authenticated user record lives inside the caller's session and owns
//! the current token pair.

use serde::{Deserialize, Serialize};

/// Access/refresh token pair
///
/// Both tokens are replaced together on refresh and discarded together on
/// logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer token for API calls
    pub access_token: String,
    /// Long-lived token used to mint new access tokens
    pub refresh_token: String,
}

impl TokenPair {
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }
}

/// Authenticated user record stored in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    /// Full-resolution profile image URL
    pub profile_image_url: Option<String>,
    pub profile_banner_url: Option<String>,
    pub access_token: String,
    /// Empty when the provider did not issue a refresh token
    pub refresh_token: String,
}

impl User {
    /// Current token pair of this user.
    #[must_use]
    pub fn token_pair(&self) -> TokenPair {
        TokenPair::new(self.access_token.clone(), self.refresh_token.clone())
    }

    /// Replace both tokens at once.
    pub fn replace_tokens(&mut self, tokens: TokenPair) {
        self.access_token = tokens.access_token;
        self.refresh_token = tokens.refresh_token;
    }

    #[must_use]
    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }

    #[must_use]
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

/// Payload handed to the session change callback
///
/// Login and logout carry whole user records; refresh carries token pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum SessionSnapshot {
    User(User),
    Tokens(TokenPair),
}

impl SessionSnapshot {
    #[must_use]
    pub fn as_user(&self) -> Option<&User> {
        match self {
            Self::User(user) => Some(user),
            Self::Tokens(_) => None,
        }
    }

    #[must_use]
    pub fn as_tokens(&self) -> Option<&TokenPair> {
        match self {
            Self::Tokens(tokens) => Some(tokens),
            Self::User(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "u1".into(),
            username: "bob".into(),
            profile_image_url: Some("https://pbs.twimg.com/img.jpg".into()),
            profile_banner_url: None,
            access_token: "AT".into(),
            refresh_token: "RT".into(),
        }
    }

    #[test]
    fn test_replace_tokens() {
        let mut user = user();
        user.replace_tokens(TokenPair::new("AT2", "RT2"));
        assert_eq!(user.token_pair(), TokenPair::new("AT2", "RT2"));
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let json = serde_json::to_value(user()).unwrap();
        assert_eq!(json["profileImageUrl"], "https://pbs.twimg.com/img.jpg");
        assert_eq!(json["accessToken"], "AT");
        assert_eq!(json["refreshToken"], "RT");
    }

    #[test]
    fn test_missing_refresh_token() {
        let mut user = user();
        user.refresh_token.clear();
        assert!(!user.has_refresh_token());
        assert!(user.has_access_token());
    }

    #[test]
    fn test_snapshot_accessors() {
        let snapshot = SessionSnapshot::Tokens(TokenPair::new("a", "r"));
        assert!(snapshot.as_user().is_none());
        assert_eq!(snapshot.as_tokens().unwrap().access_token, "a");
    }
}
