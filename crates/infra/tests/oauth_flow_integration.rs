//! End-to-end OAuth flow against a mock provider
//!
//! A wiremock server stands in for the X API: token, revoke and profile
//! endpoints plus arbitrary API endpoints. Call counts are asserted with
//! `expect(n)`, verified when the server drops.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xauth_domain::{
    AuthError, ClientConfig, MemorySession, Session, SessionSnapshot, TokenPair, User,
};
use xauth_infra::testing::{RecordingCallback, ScriptedTransport};
use xauth_infra::{TransportError, XAuthClient};

const BASIC: &str = "Basic Y2xpZW50LWlkOmNsaWVudC1zZWNyZXQ=";

fn client_for(server: &MockServer) -> XAuthClient {
    let config = ClientConfig::with_endpoints(
        "client-id",
        "client-secret",
        "http://localhost:3000/callback",
        &format!("{}/2", server.uri()),
        &format!("{}/i/oauth2/authorize", server.uri()),
    )
    .expect("valid config");
    XAuthClient::new(config).expect("client builds")
}

fn signed_in(access: &str, refresh: &str) -> MemorySession {
    MemorySession::with_id("sess-42").with_user(User {
        id: "42".into(),
        username: "ferris".into(),
        profile_image_url: Some("https://pbs.twimg.com/p.jpg".into()),
        profile_banner_url: None,
        access_token: access.into(),
        refresh_token: refresh.into(),
    })
}

/// Authorization URL carries exactly the seven PKCE parameters and a fresh
/// verifier/state per call.
#[tokio::test]
async fn authorization_url_is_fresh_per_call() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let mut session = MemorySession::new();

    let first = client.authorization_url(&mut session);
    let first_verifier = session.code_verifier().map(str::to_string);
    let second = client.authorization_url(&mut session);
    let second_verifier = session.code_verifier().map(str::to_string);

    assert_eq!(first.url.path(), "/i/oauth2/authorize");
    let keys: HashSet<String> = first.url.query_pairs().map(|(k, _)| k.into_owned()).collect();
    let expected: HashSet<String> = [
        "response_type",
        "client_id",
        "redirect_uri",
        "scope",
        "state",
        "code_challenge",
        "code_challenge_method",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    assert_eq!(keys, expected);
    assert_eq!(first.url.query_pairs().count(), 7);

    assert_ne!(first.url, second.url);
    assert_ne!(first.state, second.state);
    assert!(first_verifier.is_some() && second_verifier.is_some());
    assert_ne!(first_verifier, second_verifier);
}

/// Code exchange plus profile fetch signs the user in, strips `_normal` and
/// fires `(None, user, session id)`.
#[tokio::test]
async fn callback_signs_user_in() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let recorder = RecordingCallback::new();
    client.on_session_change(recorder.handler());

    let mut session = MemorySession::with_id("sess-42");
    client.authorization_url(&mut session);
    let verifier = session.code_verifier().expect("verifier stored").to_string();

    Mock::given(method("POST"))
        .and(path("/2/oauth2/token"))
        .and(header("authorization", BASIC))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code"))
        .and(body_string_contains(format!("code_verifier={verifier}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "bearer",
            "expires_in": 7200,
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "scope": "tweet.read users.read offline.access"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .and(query_param("user.fields", "profile_image_url,profile_banner_url"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": "42",
                "username": "ferris",
                "profile_image_url": "https://pbs.twimg.com/profile_images/1/avatar_normal.jpg",
                "profile_banner_url": "https://pbs.twimg.com/profile_banners/42/1"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = client.handle_callback("auth-code", &mut session).await.expect("sign in");

    assert_eq!(user.id, "42");
    assert_eq!(
        user.profile_image_url.as_deref(),
        Some("https://pbs.twimg.com/profile_images/1/avatar.jpg")
    );
    assert_eq!(user.token_pair(), TokenPair::new("access-1", "refresh-1"));
    assert_eq!(session.user(), Some(&user));
    assert!(session.code_verifier().is_none());

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].old, None);
    assert_eq!(events[0].new, Some(SessionSnapshot::User(user)));
    assert_eq!(events[0].session_id, "sess-42");
}

/// A rejected code yields the opaque error and leaves the session signed out.
#[tokio::test]
async fn token_endpoint_failure_is_opaque() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let recorder = RecordingCallback::new();
    client.on_session_change(recorder.handler());

    Mock::given(method("POST"))
        .and(path("/2/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_request",
            "error_description": "Value passed for the authorization code was invalid."
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = MemorySession::new();
    client.authorization_url(&mut session);

    let err = client.handle_callback("bad-code", &mut session).await.unwrap_err();
    assert_eq!(err, AuthError::AuthenticationFailed);
    assert_eq!(err.to_string(), "Authentication failed");
    assert!(session.user().is_none());
    assert!(recorder.events().is_empty());
}

/// A network failure on the code exchange is just as opaque as a rejection.
#[tokio::test]
async fn token_endpoint_network_error_is_opaque() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_error(TransportError::Timeout("token endpoint timed out".into()));
    let config =
        ClientConfig::new("client-id", "client-secret", "http://localhost:3000/callback")
            .expect("valid config");
    let client =
        XAuthClient::builder(config).transport(transport.clone()).build().expect("client builds");
    let recorder = RecordingCallback::new();
    client.on_session_change(recorder.handler());

    let mut session = MemorySession::new();
    client.authorization_url(&mut session);

    let err = client.handle_callback("auth-code", &mut session).await.unwrap_err();
    assert_eq!(err, AuthError::AuthenticationFailed);
    assert!(session.user().is_none());
    assert!(recorder.events().is_empty());
    assert_eq!(transport.request_count(), 1);
}

/// 401 on the first fetch refreshes once and replays with the new token.
#[tokio::test]
async fn expired_token_is_refreshed_transparently() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("GET"))
        .and(path("/2/tweets/1"))
        .and(header("authorization", "Bearer expired"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"title": "Unauthorized"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2/oauth2/token"))
        .and(header("authorization", BASIC))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "refresh_token": "refresh-2"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/1"))
        .and(header("authorization", "Bearer access-2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "1", "text": "hi"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut session = signed_in("expired", "refresh-1");
    let body = client.get("tweets/1", None, None, &mut session).await.expect("request succeeds");

    assert_eq!(body, json!({"data": {"id": "1", "text": "hi"}}));
    assert_eq!(
        session.user().map(User::token_pair),
        Some(TokenPair::new("access-2", "refresh-2"))
    );
}

/// A failing refresh surfaces as "Authentication failed" after one fetch.
#[tokio::test]
async fn failed_refresh_stops_after_one_fetch() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = signed_in("expired", "refresh-1");
    let err = client.get("users/me", None, None, &mut session).await.unwrap_err();

    assert_eq!(err.to_string(), "Authentication failed");
    assert_eq!(session.user().map(|u| u.access_token.as_str()), Some("expired"));
}

#[tokio::test]
async fn rate_limit_and_http_errors_are_classified() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({"title": "Too Many Requests"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/2/tweets/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "title": "Not Found Error",
            "detail": "Could not find tweet with id: [9]."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = signed_in("access-1", "refresh-1");

    let err = client
        .post("tweets", Some(json!({"text": "hello"})), None, &mut session)
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::RateLimited { status: 429 });

    let err = client.delete("tweets/9", None, None, &mut session).await.unwrap_err();
    assert_eq!(
        err,
        AuthError::ProviderHttp {
            status: 404,
            message: "Could not find tweet with id: [9].".into()
        }
    );
}

/// Logout revokes the access token, notifies `(user, None)` and destroys.
#[tokio::test]
async fn logout_revokes_and_destroys() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let recorder = RecordingCallback::new();
    client.on_session_change(recorder.handler());

    Mock::given(method("POST"))
        .and(path("/2/oauth2/revoke"))
        .and(header("authorization", BASIC))
        .and(body_string_contains("token=access-1"))
        .and(body_string_contains("token_type_hint=access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"revoked": true})))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = signed_in("access-1", "refresh-1");
    client.logout(&mut session).await;

    assert!(session.is_destroyed());
    assert!(session.user().is_none());

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    let old_user = events[0].old.as_ref().and_then(SessionSnapshot::as_user);
    assert_eq!(old_user.map(|u| u.id.as_str()), Some("42"));
    assert_eq!(events[0].new, None);
}

/// Without an access token no revoke call is made, yet the callback fires
/// and the session is destroyed. Logging out again is harmless.
#[tokio::test]
async fn logout_without_token_skips_revocation() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let recorder = RecordingCallback::new();
    client.on_session_change(recorder.handler());

    Mock::given(method("POST"))
        .and(path("/2/oauth2/revoke"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = signed_in("", "refresh-1");
    client.logout(&mut session).await;
    assert!(session.is_destroyed());

    let mut empty = MemorySession::new();
    client.logout(&mut empty).await;
    client.logout(&mut empty).await;
    assert!(empty.is_destroyed());

    let events = recorder.events();
    assert_eq!(events.len(), 3);
    assert!(events[0].old.is_some());
    assert!(events[1..].iter().all(|e| e.old.is_none() && e.new.is_none()));
}

/// Revocation errors never abort logout.
#[tokio::test]
async fn logout_ignores_revocation_errors() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/2/oauth2/revoke"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = signed_in("access-1", "refresh-1");
    client.logout(&mut session).await;
    assert!(session.is_destroyed());
}

/// Refreshes are not deduplicated: two handles holding the same expired
/// token each run their own refresh grant.
#[tokio::test]
async fn concurrent_expiry_refreshes_per_session() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .and(header("authorization", "Bearer expired"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2/oauth2/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "access-2"})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .and(header("authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "42"}})))
        .expect(2)
        .mount(&server)
        .await;

    let mut first = signed_in("expired", "refresh-1");
    let mut second = signed_in("expired", "refresh-1");

    let (a, b) = tokio::join!(
        client.get("users/me", None, None, &mut first),
        client.get("users/me", None, None, &mut second),
    );
    assert!(a.is_ok() && b.is_ok());

    for session in [&first, &second] {
        assert_eq!(session.user().map(|u| u.access_token.as_str()), Some("access-2"));
    }
}
