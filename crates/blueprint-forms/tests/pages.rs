use blueprint_forms::render::page_config;
use blueprint_forms::{FormMode, render_form_page};
use blueprint_schema::{FieldOverrides, ResolvedSchema};
use serde_json::{Value, json};

fn ticket() -> ResolvedSchema {
    blueprint_fixtures::resolver("http://localhost:9700/")
        .unwrap()
        .resolve("ticket")
        .unwrap()
}

fn embedded_config(html: &str) -> Value {
    let start = html.find(r#"type="application/json""#).unwrap();
    let body = &html[start..];
    let open = body.find('>').unwrap() + 1;
    let close = body.find("</script>").unwrap();
    serde_json::from_str(&body[open..close].replace("<\\/", "</")).unwrap()
}

#[test]
fn create_page() {
    let html = render_form_page(&ticket(), &FormMode::Create, None, "tok");
    assert!(html.contains("<h1>Create Ticket</h1>"));
    assert!(html.contains(r#"<form id="bp-ticket-form" class="bp-form bp-form-js">"#));
    assert!(html.contains(r#"<button type="submit" class="bp-submit">Create</button>"#));
    // status defaults to open
    assert!(html.contains(r#"<option value="open" selected>"#));

    let config = embedded_config(&html);
    assert_eq!(config["formId"], "bp-ticket-form");
    assert_eq!(config["endpoint"], "http://localhost:9700/blueprint/v1/tickets");
    assert_eq!(config["nonce"], "tok");
    assert_eq!(config["options"]["method"], "POST");
    assert_eq!(config["options"]["successMessage"], "Create successful!");
    assert_eq!(config["options"]["resetOnSuccess"], true);
    assert_eq!(config["fields"][0]["name"], "title");
    assert_eq!(config["fields"][0]["required"], true);
}

#[test]
fn edit_page_targets_the_record() {
    let data = json!({ "title": "Printer jam", "status": "closed" });
    let html = render_form_page(&ticket(), &FormMode::Edit("2".into()), data.as_object(), "");
    assert!(html.contains("<h1>Edit Ticket</h1>"));
    assert!(html.contains(r#"value="Printer jam""#));
    assert!(html.contains(r#"<option value="closed" selected>"#));

    let config = embedded_config(&html);
    assert_eq!(config["endpoint"], "http://localhost:9700/blueprint/v1/tickets/2");
    assert_eq!(config["options"]["method"], "PUT");
    assert_eq!(config["options"]["successMessage"], "Edit successful!");
    assert_eq!(config["options"]["resetOnSuccess"], false);
}

#[test]
fn config_matches_page_config() {
    let schema = ticket();
    let html = render_form_page(&schema, &FormMode::Create, None, "tok");
    let expected = serde_json::to_value(page_config(&schema, &FormMode::Create, "tok")).unwrap();
    assert_eq!(embedded_config(&html), expected);
}

#[test]
fn no_fields_no_form() {
    let mut schema = ticket();
    schema.resolved_fields.clear();
    schema.fields = FieldOverrides::new();
    assert_eq!(
        render_form_page(&schema, &FormMode::Create, None, ""),
        r#"<div class="bp-form-container"><p>No fields defined for ticket collection.</p></div>"#
    );
}
