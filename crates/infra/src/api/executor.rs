//! Single-request executor
//!
//! Builds one HTTP request from (method, endpoint, data, options), sends it
//! through the transport and classifies the response. No retries happen here.

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use xauth_domain::{AuthError, ClientConfig, Result};

use super::request::{param_value, BodyEncoding, RequestOptions};
use crate::http::{HttpRequest, HttpResponse, HttpTransport, RequestBody};

/// Body fields checked, in order, for a provider error message.
const ERROR_MESSAGE_FIELDS: &[&str] = &["error_description", "detail", "title", "error", "message"];

/// Builds, sends and interprets single requests against the provider API
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    config: Arc<ClientConfig>,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>, config: Arc<ClientConfig>) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a request.
    ///
    /// GET data becomes query parameters; other methods carry it as a JSON or
    /// form body per `options.encoding`. `null` data means no parameters and
    /// no body.
    ///
    /// # Errors
    /// `AuthError::InvalidRequest` if the endpoint does not resolve or the data
    /// cannot be encoded as requested.
    pub fn build(
        &self,
        method: Method,
        endpoint: &str,
        data: &Value,
        options: &RequestOptions,
        bearer: Option<&str>,
    ) -> Result<HttpRequest> {
        let mut url = self.config.endpoint_url(endpoint)?;
        let is_get = method == Method::GET;

        let body = if is_get {
            match data {
                Value::Null => {}
                Value::Object(map) => {
                    let pairs: Vec<(&String, String)> = map
                        .iter()
                        .filter_map(|(key, value)| param_value(value).map(|v| (key, v)))
                        .collect();
                    // An empty query_pairs_mut() would still leave a trailing '?'
                    if !pairs.is_empty() {
                        url.query_pairs_mut().extend_pairs(pairs);
                    }
                }
                _ => {
                    return Err(AuthError::InvalidRequest(
                        "GET data must be an object of query parameters".to_string(),
                    ))
                }
            }
            RequestBody::Empty
        } else {
            encode_body(data, options.encoding)?
        };

        let mut request = HttpRequest::new(method, url);
        for (name, value) in &options.headers {
            request.set_header(name.clone(), value.clone());
        }
        if let Some(content_type) = body.content_type() {
            request.set_header("Content-Type", content_type);
        }
        if let Some(token) = bearer {
            request.set_header("Authorization", format!("Bearer {token}"));
        }
        request.body = body;

        Ok(request)
    }

    /// Send a request, mapping transport failures to `AuthError::Transport`.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.transport.execute(request).await.map_err(|err| AuthError::Transport(err.to_string()))
    }

    /// Build, send and interpret in one step.
    pub async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        data: &Value,
        options: &RequestOptions,
        bearer: Option<&str>,
    ) -> Result<Value> {
        let request = self.build(method, endpoint, data, options, bearer)?;
        let response = self.send(request).await?;
        Self::interpret(&response)
    }

    /// Classify a response.
    ///
    /// 2xx parses as JSON (empty body is `null`), 429 is `RateLimited`, and
    /// any other status is `ProviderHttp` with a message from the body or the
    /// status text.
    pub fn interpret(response: &HttpResponse) -> Result<Value> {
        if response.is_success() {
            if response.body.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&response.body)
                .map_err(|err| AuthError::Decode(err.to_string()));
        }

        if response.status == 429 {
            debug!(status = response.status, "provider rate limit hit");
            return Err(AuthError::RateLimited { status: response.status });
        }

        Err(AuthError::ProviderHttp {
            status: response.status,
            message: error_message(response),
        })
    }
}

fn encode_body(data: &Value, encoding: BodyEncoding) -> Result<RequestBody> {
    if data.is_null() {
        return Ok(RequestBody::Empty);
    }
    match encoding {
        BodyEncoding::Json => Ok(RequestBody::Json(data.clone())),
        BodyEncoding::Form => match data {
            Value::Object(map) => Ok(RequestBody::Form(
                map.iter()
                    .filter_map(|(key, value)| param_value(value).map(|v| (key.clone(), v)))
                    .collect(),
            )),
            _ => Err(AuthError::InvalidRequest(
                "form-encoded data must be an object".to_string(),
            )),
        },
    }
}

fn error_message(response: &HttpResponse) -> String {
    let from_json = serde_json::from_str::<Value>(&response.body).ok().and_then(|body| {
        ERROR_MESSAGE_FIELDS
            .iter()
            .find_map(|field| body.get(*field).and_then(Value::as_str).map(str::to_string))
    });

    from_json
        .or_else(|| {
            let text = response.body.trim();
            (!text.is_empty()).then(|| text.to_string())
        })
        .unwrap_or_else(|| response.status_text.clone())
}
