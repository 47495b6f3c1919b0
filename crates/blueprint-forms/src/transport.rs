use http::{Method, Request, Response};
use tracing::warn;

use crate::error::TransportError;

/// Sends one HTTP exchange. Non-2xx responses are still `Ok`; only a
/// request that never got an answer is an error.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, TransportError>;
}

/// Blocking transport backed by a `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, TransportError> {
        let (parts, body) = request.into_parts();
        let uri = parts.uri.to_string();

        let result = match parts.method {
            Method::GET | Method::HEAD | Method::DELETE => {
                let mut builder = match parts.method {
                    Method::HEAD => self.agent.head(uri.as_str()),
                    Method::DELETE => self.agent.delete(uri.as_str()),
                    _ => self.agent.get(uri.as_str()),
                };
                for (name, value) in &parts.headers {
                    builder = builder.header(name, value);
                }
                builder.call()
            }
            method => {
                let mut builder = match method {
                    Method::PUT => self.agent.put(uri.as_str()),
                    Method::PATCH => self.agent.patch(uri.as_str()),
                    Method::POST => self.agent.post(uri.as_str()),
                    other => {
                        warn!(method = %other, uri = %uri, "unsupported method, sending as POST");
                        self.agent.post(uri.as_str())
                    }
                };
                for (name, value) in &parts.headers {
                    builder = builder.header(name, value);
                }
                builder.send(&body[..])
            }
        };

        let response = result.map_err(|e| {
            warn!(uri = %uri, error = %e, "request failed");
            TransportError::Failed(e.to_string())
        })?;
        let (parts, mut body) = response.into_parts();
        let bytes = body
            .read_to_vec()
            .map_err(|e| TransportError::Failed(e.to_string()))?;
        Ok(Response::from_parts(parts, bytes))
    }
}
