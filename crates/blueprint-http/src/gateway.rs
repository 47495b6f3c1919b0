use std::sync::Arc;

use blueprint_schema::{Resolver, is_valid_key};
use http::header::{ALLOW, CONTENT_TYPE};
use http::{Method, Request, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, error};

use crate::error::GatewayError;

#[derive(Serialize)]
struct Envelope<T> {
    data: T,
}

enum Route<'a> {
    List,
    Get(&'a str),
}

fn route(path: &str) -> Option<Route<'_>> {
    if path == "/schemas" {
        return Some(Route::List);
    }
    let key = path.strip_prefix("/schemas/")?;
    if key.is_empty() || key.contains('/') {
        return None;
    }
    Some(Route::Get(key))
}

/// Read-only HTTP surface over a [`Resolver`]:
///
/// - `GET /schemas` lists summaries of every loadable schema.
/// - `GET /schemas/{key}` returns one resolved schema.
///
/// Both wrap their payload in `{ "data": ... }`; failures are
/// `{ "error": "..." }`.
pub struct SchemaGateway {
    resolver: Arc<Resolver>,
}

impl SchemaGateway {
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn handle(&self, req: Request<Vec<u8>>) -> Response<Vec<u8>> {
        let path = req.uri().path().trim_end_matches('/');

        let result = match route(path) {
            None => Err(GatewayError::RouteNotFound),
            Some(_) if req.method() != Method::GET => Err(GatewayError::MethodNotAllowed),
            Some(Route::List) => self.list(),
            Some(Route::Get(key)) => self.get(key),
        };

        match result {
            Ok(body) => json_response(StatusCode::OK, body),
            Err(e) => {
                let status = e.status_code();
                if status.is_server_error() {
                    error!(path, error = %e, "schema request failed");
                } else {
                    debug!(path, method = %req.method(), status = status.as_u16(), "schema request rejected");
                }
                let mut response = error_response(status, &e.to_string());
                if status == StatusCode::METHOD_NOT_ALLOWED {
                    response
                        .headers_mut()
                        .insert(ALLOW, http::HeaderValue::from_static("GET"));
                }
                response
            }
        }
    }

    fn list(&self) -> Result<Vec<u8>, GatewayError> {
        let summaries = self.resolver.summaries();
        Ok(serde_json::to_vec(&Envelope { data: summaries })?)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, GatewayError> {
        if !is_valid_key(key) {
            return Err(GatewayError::RouteNotFound);
        }
        let schema = self.resolver.resolve(key)?;
        Ok(serde_json::to_vec(&Envelope { data: schema })?)
    }
}

pub fn json_response(status: StatusCode, body: impl Into<Vec<u8>>) -> Response<Vec<u8>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

pub fn error_response(status: StatusCode, message: &str) -> Response<Vec<u8>> {
    let body = serde_json::json!({ "error": message });
    json_response(status, body.to_string().into_bytes())
}
