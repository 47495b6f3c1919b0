#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use blueprint_forms::{ApiClient, Transport, TransportError};
use blueprint_http::{SchemaGateway, json_response};
use http::{Method, Request, Response, StatusCode};
use serde_json::{Map, Value, json};

pub const BASE: &str = "http://api.test";
pub const TICKETS: &str = "http://api.test/blueprint/v1/tickets";
pub const REPLIES: &str = "http://api.test/blueprint/v1/ticket_replies";

/// In-process backend: schema routes go to the real gateway, the ticket
/// and reply collections are served from memory.
pub struct Backend {
    gateway: SchemaGateway,
    replies: Mutex<Vec<Map<String, Value>>>,
    pub log: Mutex<Vec<(Method, String, Value)>>,
    pub nonces: Mutex<Vec<Option<String>>>,
    pub down: AtomicBool,
}

impl Backend {
    pub fn new() -> Arc<Self> {
        let resolver = blueprint_fixtures::resolver(&format!("{BASE}/")).unwrap();
        let replies = [(11, "second", 2), (10, "first", 1), (12, "third", 3)]
            .into_iter()
            .map(|(id, message, position)| {
                json!({ "id": id, "ticket_id": 2, "message": message, "position": position })
                    .as_object()
                    .unwrap()
                    .clone()
            })
            .collect();
        Arc::new(Self {
            gateway: SchemaGateway::new(Arc::new(resolver)),
            replies: Mutex::new(replies),
            log: Mutex::new(Vec::new()),
            nonces: Mutex::new(Vec::new()),
            down: AtomicBool::new(false),
        })
    }

    pub fn client(self: &Arc<Self>) -> ApiClient {
        ApiClient::new(self.clone(), BASE).with_nonce("n0nce")
    }

    pub fn calls(&self) -> Vec<(Method, String)> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .map(|(m, u, _)| (m.clone(), u.clone()))
            .collect()
    }

    pub fn last_body(&self) -> Value {
        self.log.lock().unwrap().last().map(|(_, _, b)| b.clone()).unwrap_or(Value::Null)
    }

    pub fn reply_positions(&self) -> Vec<(i64, i64)> {
        let mut out: Vec<(i64, i64)> = self
            .replies
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r["id"].as_i64().unwrap(), r["position"].as_i64().unwrap()))
            .collect();
        out.sort();
        out
    }

    fn ticket(id: &str) -> Option<Value> {
        (id == "2").then(|| {
            json!({
                "id": 2,
                "title": "Printer jam",
                "description": "Paper stuck",
                "status": "pending",
                "priority": "high",
                "contact_email": "sam@example.com"
            })
        })
    }

    fn respond(status: StatusCode, body: Value) -> Response<Vec<u8>> {
        json_response(status, body.to_string().into_bytes())
    }
}

impl Transport for Backend {
    fn send(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, TransportError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(TransportError::Failed("connection refused".into()));
        }
        let method = req.method().clone();
        let uri = req.uri().to_string();
        let path = req.uri().path().to_string();
        let body: Value = serde_json::from_slice(req.body()).unwrap_or(Value::Null);
        self.log.lock().unwrap().push((method.clone(), uri.clone(), body.clone()));
        self.nonces.lock().unwrap().push(
            req.headers()
                .get("x-csrf-token")
                .map(|v| v.to_str().unwrap().to_string()),
        );

        if path.starts_with("/schemas") {
            return Ok(self.gateway.handle(req));
        }

        let tickets = "/blueprint/v1/tickets";
        let replies = "/blueprint/v1/ticket_replies";
        let response = match (method, path.as_str()) {
            (Method::POST, p) if p == tickets => {
                if body["title"] == "reject" {
                    Self::respond(
                        StatusCode::UNPROCESSABLE_ENTITY,
                        json!({
                            "message": "Validation failed",
                            "errors": { "title": ["Title already exists"] }
                        }),
                    )
                } else {
                    let mut record = body.clone();
                    record["id"] = json!(3);
                    Self::respond(StatusCode::CREATED, json!({ "data": record }))
                }
            }
            (Method::GET, p) if p.starts_with(tickets) => {
                match p.strip_prefix(tickets).and_then(|r| r.strip_prefix('/')).and_then(Self::ticket) {
                    Some(record) => Self::respond(StatusCode::OK, json!({ "data": record })),
                    None => Self::respond(StatusCode::NOT_FOUND, json!({ "message": "No such ticket" })),
                }
            }
            (Method::PUT, p) if p.starts_with(tickets) => {
                Self::respond(StatusCode::OK, json!({ "data": body }))
            }
            (Method::GET, p) if p == replies => {
                let query = req.uri().query().unwrap_or_default().to_string();
                let items: Vec<Value> = if query.contains("ticket_id=2") {
                    self.replies.lock().unwrap().iter().cloned().map(Value::Object).collect()
                } else {
                    Vec::new()
                };
                Self::respond(StatusCode::OK, json!({ "data": { "items": items } }))
            }
            (Method::PATCH, p) if p.starts_with(replies) => {
                let id: i64 = p.rsplit('/').next().unwrap().parse().unwrap();
                let mut replies = self.replies.lock().unwrap();
                let reply = replies.iter_mut().find(|r| r["id"] == id).unwrap();
                for (key, value) in body.as_object().unwrap() {
                    reply.insert(key.clone(), value.clone());
                }
                Self::respond(StatusCode::OK, json!({ "data": Value::Object(reply.clone()) }))
            }
            _ => Self::respond(StatusCode::NOT_FOUND, json!({ "error": "not found" })),
        };
        Ok(response)
    }
}
