//! OAuth 2.0 client for the X API with PKCE support
//!
//! Handles the token lifecycle against the provider, including:
//! - Authorization URL building (PKCE challenge + anti-CSRF state)
//! - Authorization code exchange and profile fetch
//! - Token refresh
//! - Token revocation on logout

use std::sync::Arc;

use reqwest::Method;
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};
use xauth_common::crypto::CHALLENGE_METHOD;
use xauth_common::{basic_authorization, AuthorizationRequest};
use xauth_domain::constants::{
    scope_string, PROFILE_ENDPOINT, PROFILE_FIELDS, PROFILE_FIELDS_PARAM, REVOKE_ENDPOINT,
    TOKEN_ENDPOINT,
};
use xauth_domain::{AuthError, ClientConfig, Result, Session, SessionSnapshot, TokenPair, User};

use super::notifier::SessionNotifier;
use super::profile::{ProfileEnvelope, ProfileImageNormalizer, StripSizeSuffix};
use super::types::{AuthorizationUrl, TokenResponse};
use crate::api::{RequestExecutor, RequestOptions};
use crate::http::{HttpRequest, HttpTransport, RequestBody, ReqwestTransport};

/// OAuth 2.0 client for a single X application
///
/// The client holds no per-user state: every operation takes the caller's
/// session and reads or writes the user and code verifier stored there. One
/// client can be shared across sessions behind an `Arc`.
///
/// # Examples
/// ```no_run
/// use xauth_domain::{ClientConfig, MemorySession};
/// use xauth_infra::XAuthClient;
///
/// # async fn example() -> xauth_domain::Result<()> {
/// let config = ClientConfig::new("client-id", "client-secret", "http://localhost:3000/callback")?;
/// let client = XAuthClient::new(config)?;
/// let mut session = MemorySession::new();
///
/// let redirect = client.authorization_url(&mut session);
/// // Send the browser to `redirect.url`, then on callback:
/// let user = client.handle_callback("code-from-query", &mut session).await?;
/// println!("signed in as {}", user.username);
/// # Ok(())
/// # }
/// ```
pub struct XAuthClient {
    pub(crate) executor: RequestExecutor,
    pub(crate) notifier: SessionNotifier,
    normalizer: Arc<dyn ProfileImageNormalizer>,
}

impl XAuthClient {
    /// Create a client with the default reqwest transport.
    ///
    /// # Errors
    /// Returns `AuthError::Config` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: ClientConfig) -> XAuthClientBuilder {
        XAuthClientBuilder::new(config)
    }

    pub fn config(&self) -> &ClientConfig {
        self.executor.config()
    }

    /// Register the session change callback, replacing any previous one.
    pub fn on_session_change<F>(&self, callback: F)
    where
        F: Fn(Option<&SessionSnapshot>, Option<&SessionSnapshot>, &str) + Send + Sync + 'static,
    {
        self.notifier.set(callback);
    }

    pub fn clear_session_callback(&self) {
        self.notifier.clear();
    }

    /// Build the provider authorization URL for a new login attempt.
    ///
    /// A fresh verifier, challenge and state are generated on every call; the
    /// verifier replaces any previous one in the session.
    pub fn authorization_url<S: Session + ?Sized>(&self, session: &mut S) -> AuthorizationUrl {
        let AuthorizationRequest { pkce, state } = AuthorizationRequest::generate();
        let config = self.config();
        let scope = scope_string();

        let params = [
            ("response_type", "code"),
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("scope", scope.as_str()),
            ("state", state.as_str()),
            ("code_challenge", pkce.challenge.as_str()),
            ("code_challenge_method", CHALLENGE_METHOD),
        ]
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

        let mut url = config.authorize_url.clone();
        url.set_query(Some(&params));

        session.set_code_verifier(Some(pkce.verifier));
        debug!(session_id = %session.id(), "authorization URL generated");

        AuthorizationUrl { url, state }
    }

    /// Exchange an authorization code for tokens and sign the user in.
    ///
    /// On success the user is stored in the session and the callback fires
    /// with `(None, user)`.
    ///
    /// # Errors
    /// Any failure yields `AuthError::AuthenticationFailed`; the cause is only
    /// logged. The session's user is left untouched.
    #[instrument(skip_all, fields(session_id = %session.id()))]
    pub async fn handle_callback<S: Session + ?Sized>(
        &self,
        code: &str,
        session: &mut S,
    ) -> Result<User> {
        let Some(verifier) = session.take_code_verifier() else {
            warn!("no code verifier in session; authorization was not started here");
            return Err(AuthError::AuthenticationFailed);
        };
        if code.is_empty() {
            warn!("callback received without an authorization code");
            return Err(AuthError::AuthenticationFailed);
        }

        let user = match self.sign_in(code, &verifier).await {
            Ok(user) => user,
            Err(err) => {
                error!(error = %err, "Authentication failed");
                return Err(AuthError::AuthenticationFailed);
            }
        };

        session.set_user(Some(user.clone()));
        let snapshot = SessionSnapshot::User(user.clone());
        self.notifier.notify(None, Some(&snapshot), session.id());
        info!(user_id = %user.id, "user signed in");

        Ok(user)
    }

    async fn sign_in(&self, code: &str, verifier: &str) -> Result<User> {
        let config = self.config();
        let tokens = self
            .token_grant(vec![
                ("code", code.to_string()),
                ("grant_type", "authorization_code".to_string()),
                ("client_id", config.client_id.clone()),
                ("redirect_uri", config.redirect_uri.clone()),
                ("code_verifier", verifier.to_string()),
            ])
            .await?;

        let profile = self.fetch_profile(&tokens.access_token).await?;
        let pair = TokenPair::new(tokens.access_token, tokens.refresh_token.unwrap_or_default());

        Ok(profile.data.into_user(pair, self.normalizer.as_ref()))
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProfileEnvelope> {
        let value = self
            .executor
            .execute(
                Method::GET,
                PROFILE_ENDPOINT,
                &json!({ PROFILE_FIELDS_PARAM: PROFILE_FIELDS }),
                &RequestOptions::new(),
                Some(access_token),
            )
            .await?;
        serde_json::from_value(value).map_err(|err| AuthError::Decode(err.to_string()))
    }

    /// Trade the session user's refresh token for a new token pair.
    ///
    /// The new pair is written to the session and the callback fires with
    /// `(old pair, new pair)`. A provider that does not rotate refresh tokens
    /// leaves the previous refresh token in place.
    ///
    /// # Errors
    /// `AuthError::RefreshFailed` if the session has no refresh token (no
    /// request is sent) or the provider rejects the grant.
    #[instrument(skip_all, fields(session_id = %session.id()))]
    pub async fn refresh_token<S: Session + ?Sized>(&self, session: &mut S) -> Result<TokenPair> {
        let Some(old) = session.user().filter(|user| user.has_refresh_token()).map(User::token_pair)
        else {
            warn!("Refresh token is missing");
            return Err(AuthError::RefreshFailed);
        };

        let response = self
            .token_grant(vec![
                ("grant_type", "refresh_token".to_string()),
                ("refresh_token", old.refresh_token.clone()),
            ])
            .await
            .map_err(|err| {
                error!(error = %err, "Token refresh failed");
                AuthError::RefreshFailed
            })?;

        let new = TokenPair::new(
            response.access_token,
            response.refresh_token.unwrap_or_else(|| old.refresh_token.clone()),
        );

        let Some(user) = session.user_mut() else {
            // The user was removed while the grant was in flight.
            warn!("session user disappeared during refresh");
            return Err(AuthError::RefreshFailed);
        };
        user.replace_tokens(new.clone());

        self.notifier.notify(
            Some(&SessionSnapshot::Tokens(old)),
            Some(&SessionSnapshot::Tokens(new.clone())),
            session.id(),
        );
        debug!("access token refreshed");

        Ok(new)
    }

    /// Revoke the access token (best effort), clear the user and destroy the
    /// session.
    ///
    /// Never fails: revocation errors are logged and the local sign-out
    /// proceeds regardless.
    #[instrument(skip_all, fields(session_id = %session.id()))]
    pub async fn logout<S: Session + ?Sized>(&self, session: &mut S) {
        let access_token = session
            .user()
            .filter(|user| user.has_access_token())
            .map(|user| user.access_token.clone());

        if let Some(token) = access_token {
            match self.revoke(&token).await {
                Ok(true) => info!("access token revoked"),
                Ok(false) => warn!("provider reported the token as not revoked"),
                Err(err) => {
                    let err = AuthError::RevocationFailed(err.to_string());
                    warn!(error = %err, "continuing logout without revocation");
                }
            }
        } else {
            debug!("no access token to revoke");
        }

        let old = session.user().cloned().map(SessionSnapshot::User);
        self.notifier.notify(old.as_ref(), None, session.id());
        session.set_user(None);
        session.destroy();
    }

    /// Revoke an access token. Returns the provider's `revoked` flag
    /// (assumed `true` when absent).
    pub async fn revoke(&self, access_token: &str) -> Result<bool> {
        let request = self.client_credentials_request(
            REVOKE_ENDPOINT,
            vec![
                ("token", access_token.to_string()),
                ("token_type_hint", "access_token".to_string()),
            ],
        )?;
        let response = self.executor.send(request).await?;
        let value = RequestExecutor::interpret(&response)?;

        Ok(value.get("revoked").and_then(serde_json::Value::as_bool).unwrap_or(true))
    }

    async fn token_grant(&self, fields: Vec<(&str, String)>) -> Result<TokenResponse> {
        let request = self.client_credentials_request(TOKEN_ENDPOINT, fields)?;
        let response = self.executor.send(request).await?;
        let value = RequestExecutor::interpret(&response)?;

        serde_json::from_value(value).map_err(|err| AuthError::Decode(err.to_string()))
    }

    /// Form POST authenticated with the client's Basic credentials.
    fn client_credentials_request(
        &self,
        endpoint: &str,
        fields: Vec<(&str, String)>,
    ) -> Result<HttpRequest> {
        let config = self.config();
        let body = RequestBody::Form(
            fields.into_iter().map(|(key, value)| (key.to_string(), value)).collect(),
        );

        let mut request = HttpRequest::new(Method::POST, config.endpoint_url(endpoint)?);
        if let Some(content_type) = body.content_type() {
            request.set_header("Content-Type", content_type);
        }
        request.set_header(
            "Authorization",
            basic_authorization(&config.client_id, &config.client_secret),
        );
        request.body = body;

        Ok(request)
    }
}

impl std::fmt::Debug for XAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XAuthClient")
            .field("config", self.config())
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

/// Builder for [`XAuthClient`]
pub struct XAuthClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    normalizer: Arc<dyn ProfileImageNormalizer>,
}

impl XAuthClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self { config, transport: None, normalizer: Arc::new(StripSizeSuffix) }
    }

    /// Use a custom transport instead of the default reqwest client.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn image_normalizer(mut self, normalizer: impl ProfileImageNormalizer + 'static) -> Self {
        self.normalizer = Arc::new(normalizer);
        self
    }

    /// # Errors
    /// Returns `AuthError::Config` if the default transport cannot be built.
    pub fn build(self) -> Result<XAuthClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        Ok(XAuthClient {
            executor: RequestExecutor::new(transport, Arc::new(self.config)),
            notifier: SessionNotifier::new(),
            normalizer: self.normalizer,
        })
    }
}
