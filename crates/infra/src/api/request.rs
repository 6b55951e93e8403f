//! Per-request options for the authenticated request layer

use serde_json::Value;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// How a non-GET request's data is put on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyEncoding {
    #[default]
    Json,
    Form,
}

impl BodyEncoding {
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => JSON_CONTENT_TYPE,
            Self::Form => FORM_CONTENT_TYPE,
        }
    }

    /// Recognize an encoding from a Content-Type value (parameters ignored).
    #[must_use]
    pub fn from_content_type(value: &str) -> Option<Self> {
        let mime = value.split(';').next().unwrap_or_default().trim();
        if mime.eq_ignore_ascii_case(FORM_CONTENT_TYPE) {
            Some(Self::Form)
        } else if mime.eq_ignore_ascii_case(JSON_CONTENT_TYPE) {
            Some(Self::Json)
        } else {
            None
        }
    }
}

/// Options accepted by `send_request` and the verb wrappers
///
/// The Content-Type header is always derived from [`BodyEncoding`]. Passing a
/// Content-Type through [`RequestOptions::header`] selects the encoding
/// instead of being sent verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub encoding: BodyEncoding,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Form-encode the request body.
    #[must_use]
    pub fn form() -> Self {
        Self { encoding: BodyEncoding::Form, ..Self::default() }
    }

    #[must_use]
    pub fn encoding(mut self, encoding: BodyEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Add an extra header.
    ///
    /// `Authorization` is ignored here; the bearer token always comes from the
    /// session.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();

        if name.eq_ignore_ascii_case("content-type") {
            if let Some(encoding) = BodyEncoding::from_content_type(&value) {
                self.encoding = encoding;
            }
            return self;
        }
        if name.eq_ignore_ascii_case("authorization") {
            tracing::debug!("ignoring caller-supplied Authorization header");
            return self;
        }

        self.headers.push((name, value));
        self
    }
}

/// Render a JSON scalar the way it appears in a query string or form body.
///
/// Arrays are comma-joined; `null` yields `None` so the key is skipped.
pub(crate) fn param_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(items) => {
            Some(items.iter().filter_map(param_value).collect::<Vec<_>>().join(","))
        }
        Value::Object(_) => Some(value.to_string()),
    }
}
