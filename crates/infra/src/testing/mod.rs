//! Test doubles for the transport and the session callback
//!
//! Compiled for this crate's unit tests and, for downstream crates, behind the
//! `test-utils` feature.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use xauth_domain::SessionSnapshot;

use crate::http::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Transport that replays queued responses in order and records every request
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.responses.lock().push_back(Ok(HttpResponse::new(status, body)));
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push_response(status, body.to_string());
    }

    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().push_back(Err(error));
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.to_string();
        self.requests.lock().push(request);
        self.responses.lock().pop_front().unwrap_or_else(|| {
            Err(TransportError::Request(format!("no scripted response for {url}")))
        })
    }
}

/// One observed session change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub old: Option<SessionSnapshot>,
    pub new: Option<SessionSnapshot>,
    pub session_id: String,
}

/// Collects session change notifications for assertions
#[derive(Debug, Clone, Default)]
pub struct RecordingCallback {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl RecordingCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback to pass to `XAuthClient::on_session_change`.
    pub fn handler(
        &self,
    ) -> impl Fn(Option<&SessionSnapshot>, Option<&SessionSnapshot>, &str) + Send + Sync + 'static
    {
        let events = Arc::clone(&self.events);
        move |old, new, session_id| {
            events.lock().push(SessionEvent {
                old: old.cloned(),
                new: new.cloned(),
                session_id: session_id.to_string(),
            });
        }
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().clone()
    }
}
