use std::fmt;
use std::sync::Arc;

use blueprint_schema::is_valid_key;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderName, HeaderValue, Method, Request};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::ApiError;
use crate::transport::Transport;

pub const DEFAULT_NONCE_HEADER: &str = "x-csrf-token";

/// JSON client for the schema gateway and collection endpoints. Every
/// request carries the anti-forgery token header when a token is set.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base: String,
    nonce: Option<String>,
    nonce_header: HeaderName,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, base: impl Into<String>) -> Self {
        Self {
            transport,
            base: base.into(),
            nonce: None,
            nonce_header: HeaderName::from_static(DEFAULT_NONCE_HEADER),
        }
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.set_nonce(nonce);
        self
    }

    pub fn with_nonce_header(mut self, header: HeaderName) -> Self {
        self.nonce_header = header;
        self
    }

    /// An empty token clears it.
    pub fn set_nonce(&mut self, nonce: impl Into<String>) {
        let nonce = nonce.into();
        self.nonce = if nonce.is_empty() { None } else { Some(nonce) };
    }

    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `path` joined under the base with exactly one slash between them.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Absolute URLs pass through; anything else is a path under the base.
    pub fn resolve(&self, endpoint: &str) -> String {
        match Url::parse(endpoint) {
            Ok(_) => endpoint.to_string(),
            Err(_) => self.url(endpoint),
        }
    }

    /// `GET {base}/schemas/{key}`, unwrapped from its `data` envelope.
    /// Malformed keys fail without a request.
    pub fn schema(&self, key: &str) -> Result<Value, ApiError> {
        if !is_valid_key(key) {
            return Err(ApiError::InvalidKey(key.to_string()));
        }
        let body = self.get(&self.url(&format!("schemas/{key}")))?;
        Ok(data(body))
    }

    pub fn get(&self, url: &str) -> Result<Value, ApiError> {
        self.execute(Method::GET, url, None)
    }

    pub fn get_with(&self, url: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        self.get(&with_query(url, query)?)
    }

    pub fn send_json(&self, method: Method, url: &str, body: &Value) -> Result<Value, ApiError> {
        let bytes = serde_json::to_vec(body)?;
        self.execute(method, url, Some(bytes))
    }

    fn execute(&self, method: Method, url: &str, body: Option<Vec<u8>>) -> Result<Value, ApiError> {
        let mut builder = Request::builder()
            .method(method.clone())
            .uri(url)
            .header(ACCEPT, "application/json");
        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        if let Some(nonce) = &self.nonce {
            let value = HeaderValue::from_str(nonce).map_err(http::Error::from)?;
            builder = builder.header(&self.nonce_header, value);
        }
        let request = builder.body(body.unwrap_or_default())?;

        let response = self.transport.send(request)?;
        let status = response.status();
        debug!(method = %method, url, status = status.as_u16(), "api call");

        let bytes = response.into_body();
        if !status.is_success() {
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            return Err(ApiError::Status { status, body });
        }
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base)
            .field("nonce", &self.nonce.is_some())
            .field("nonce_header", &self.nonce_header)
            .finish()
    }
}

/// Unwrap a `{ "data": ... }` envelope; bodies without one pass through.
pub fn data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Append query pairs to an absolute URL.
pub fn with_query(url: &str, query: &[(&str, String)]) -> Result<String, ApiError> {
    if query.is_empty() {
        return Ok(url.to_string());
    }
    let mut parsed = Url::parse(url)?;
    {
        let mut pairs = parsed.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    Ok(parsed.into())
}
