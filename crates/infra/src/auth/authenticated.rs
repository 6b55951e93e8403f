//! Authenticated request layer
//!
//! Sends API requests with the session user's bearer token. A 401 triggers
//! one token refresh and one replay of the identical request.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, error, instrument, warn};
use xauth_common::ErrorClassification;
use xauth_domain::{AuthError, Result, Session, User};

use super::client::XAuthClient;
use crate::api::{RequestExecutor, RequestOptions};

const UNAUTHORIZED: u16 = 401;

/// Position in the refresh-then-retry cycle of a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Initial,
    RefreshedOnce,
}

/// What to do after a 401
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Refresh,
    GiveUp,
}

impl AttemptState {
    /// Decide how to react to a 401 in this state.
    #[must_use]
    pub fn on_unauthorized(self, has_refresh_token: bool) -> RetryDecision {
        match self {
            Self::Initial if has_refresh_token => RetryDecision::Refresh,
            Self::Initial | Self::RefreshedOnce => RetryDecision::GiveUp,
        }
    }
}

fn log_failure(err: &AuthError) {
    if err.is_retryable() {
        warn!(
            error = %err,
            retry_after_secs = err.retry_after().map(|d| d.as_secs()),
            "request failed; caller may retry"
        );
    } else {
        debug!(error = %err, severity = %err.severity(), "request failed");
    }
}

impl XAuthClient {
    /// Send a request on behalf of the session user.
    ///
    /// Missing `data` and `options` default to an empty object and JSON
    /// encoding.
    ///
    /// # Errors
    /// - `AuthenticationFailed` if a 401 triggered a refresh that failed
    /// - `RateLimited` for 429
    /// - `ProviderHttp` for other non-2xx statuses, including a 401 that
    ///   survives the retry
    /// - `Transport` / `Decode` / `InvalidRequest` as raised by the executor
    #[instrument(skip_all, fields(%method, endpoint = %endpoint, session_id = %session.id()))]
    pub async fn send_request<S: Session + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        data: Option<Value>,
        options: Option<RequestOptions>,
        session: &mut S,
    ) -> Result<Value> {
        let data = data.unwrap_or_else(|| Value::Object(Map::new()));
        let options = options.unwrap_or_default();
        let mut state = AttemptState::Initial;

        loop {
            let bearer = session
                .user()
                .filter(|user| user.has_access_token())
                .map(|user| user.access_token.clone());
            let request =
                self.executor.build(method.clone(), endpoint, &data, &options, bearer.as_deref())?;
            let response = self.executor.send(request).await?;

            if response.status != UNAUTHORIZED {
                return RequestExecutor::interpret(&response).inspect_err(log_failure);
            }

            let has_refresh_token = session.user().is_some_and(User::has_refresh_token);
            match state.on_unauthorized(has_refresh_token) {
                RetryDecision::Refresh => {
                    debug!("access token rejected; refreshing");
                    if let Err(err) = self.refresh_token(session).await {
                        error!(error = %err, "refresh after 401 failed");
                        return Err(AuthError::AuthenticationFailed);
                    }
                    state = AttemptState::RefreshedOnce;
                }
                RetryDecision::GiveUp => {
                    return RequestExecutor::interpret(&response).inspect_err(log_failure)
                }
            }
        }
    }

    /// [`send_request`](Self::send_request) deserialized into `T`.
    ///
    /// # Errors
    /// Same as `send_request`, plus `Decode` if the body does not match `T`.
    pub async fn send_request_as<T, S>(
        &self,
        method: Method,
        endpoint: &str,
        data: Option<Value>,
        options: Option<RequestOptions>,
        session: &mut S,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        S: Session + ?Sized,
    {
        let value = self.send_request(method, endpoint, data, options, session).await?;
        serde_json::from_value(value).map_err(|err| AuthError::Decode(err.to_string()))
    }

    pub async fn get<S: Session + ?Sized>(
        &self,
        endpoint: &str,
        params: Option<Value>,
        options: Option<RequestOptions>,
        session: &mut S,
    ) -> Result<Value> {
        self.send_request(Method::GET, endpoint, params, options, session).await
    }

    pub async fn post<S: Session + ?Sized>(
        &self,
        endpoint: &str,
        data: Option<Value>,
        options: Option<RequestOptions>,
        session: &mut S,
    ) -> Result<Value> {
        self.send_request(Method::POST, endpoint, data, options, session).await
    }

    pub async fn put<S: Session + ?Sized>(
        &self,
        endpoint: &str,
        data: Option<Value>,
        options: Option<RequestOptions>,
        session: &mut S,
    ) -> Result<Value> {
        self.send_request(Method::PUT, endpoint, data, options, session).await
    }

    pub async fn patch<S: Session + ?Sized>(
        &self,
        endpoint: &str,
        data: Option<Value>,
        options: Option<RequestOptions>,
        session: &mut S,
    ) -> Result<Value> {
        self.send_request(Method::PATCH, endpoint, data, options, session).await
    }

    pub async fn delete<S: Session + ?Sized>(
        &self,
        endpoint: &str,
        data: Option<Value>,
        options: Option<RequestOptions>,
        session: &mut S,
    ) -> Result<Value> {
        self.send_request(Method::DELETE, endpoint, data, options, session).await
    }

    /// Typed GET.
    pub async fn get_json<T, S>(
        &self,
        endpoint: &str,
        params: Option<Value>,
        session: &mut S,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        S: Session + ?Sized,
    {
        self.send_request_as(Method::GET, endpoint, params, None, session).await
    }

    /// Typed POST with a JSON body.
    pub async fn post_json<T, S>(&self, endpoint: &str, data: Value, session: &mut S) -> Result<T>
    where
        T: DeserializeOwned,
        S: Session + ?Sized,
    {
        self.send_request_as(Method::POST, endpoint, Some(data), None, session).await
    }
}
