use std::sync::Arc;

use blueprint_http::SchemaGateway;
use http::{Method, Request, StatusCode};

fn gateway() -> SchemaGateway {
    let resolver = blueprint_fixtures::resolver("http://localhost:9700/").unwrap();
    SchemaGateway::new(Arc::new(resolver))
}

fn get(gateway: &SchemaGateway, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Vec::new())
        .unwrap();
    let resp = gateway.handle(req);
    let body = serde_json::from_slice(resp.body()).unwrap();
    (resp.status(), body)
}

// ── GET /schemas ────────────────────────────────────────────────

#[test]
fn list_returns_summaries() {
    let (status, body) = get(&gateway(), "/schemas");
    assert_eq!(status, StatusCode::OK);

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["key"], "ticket");
    assert_eq!(data[0]["name"], "TicketSchema");
    assert_eq!(data[0]["fieldCount"], 6);
    assert_eq!(data[0]["collection"]["table"], "tickets");
    assert_eq!(
        data[0]["collection"]["endpoint"],
        "http://localhost:9700/blueprint/v1/tickets"
    );
    assert_eq!(data[1]["key"], "ticket_reply");
}

#[test]
fn trailing_slash_is_ignored() {
    let (status, _) = get(&gateway(), "/schemas/");
    assert_eq!(status, StatusCode::OK);
}

// ── GET /schemas/{key} ──────────────────────────────────────────

#[test]
fn get_returns_resolved_schema() {
    let (status, body) = get(&gateway(), "/schemas/ticket");
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["key"], "ticket");
    assert_eq!(data["class"], "blueprint_fixtures::TicketSchema");
    assert_eq!(data["collection"]["model"]["table"], "tickets");

    let keys: Vec<&str> = data["resolvedFields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["key"].as_str().unwrap())
        .collect();
    assert_eq!(
        keys,
        ["title", "description", "status", "priority", "assigned_to", "contact_email"]
    );
    assert_eq!(data["resolvedFields"][0]["attributes"]["required"], true);
    assert_eq!(data["resolvedFields"][5]["type"], "email");
}

#[test]
fn unregistered_key_is_schema_not_found() {
    let (status, body) = get(&gateway(), "/schemas/bogus");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Schema not found");
}

#[test]
fn malformed_key_never_reaches_the_resolver() {
    for uri in ["/schemas/Ticket", "/schemas/ticket-1", "/schemas/ticket/extra"] {
        let (status, body) = get(&gateway(), uri);
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"], "not found", "{uri}");
    }
}

#[test]
fn missing_class_is_a_server_error() {
    use blueprint_schema::{Resolver, SchemaRegistry};

    let registry = SchemaRegistry::new();
    registry.register("ghost", "nowhere::GhostSchema").unwrap();
    let resolver = Resolver::new(
        Arc::new(registry),
        Arc::new(blueprint_fixtures::catalog()),
        Arc::new(Default::default()),
        "http://localhost/",
    );
    let (status, body) = get(&SchemaGateway::new(Arc::new(resolver)), "/schemas/ghost");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("nowhere::GhostSchema"));
}

// ── Routing ─────────────────────────────────────────────────────

#[test]
fn unknown_route_is_404() {
    let (status, body) = get(&gateway(), "/nope");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not found");
}

#[test]
fn writes_are_not_allowed() {
    let req = Request::builder()
        .method(Method::POST)
        .uri("/schemas/ticket")
        .body(b"{}".to_vec())
        .unwrap();
    let resp = gateway().handle(req);
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.headers()["allow"], "GET");
}
