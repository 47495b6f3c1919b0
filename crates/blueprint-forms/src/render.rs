//! Server-rendered forms: the static field list, the create/edit page with
//! its embedded controller config, and the mount point a dynamic form boots
//! from.

use std::fmt::Write;

use blueprint_field::markup::escape_html;
use blueprint_field::{FieldDefinition, humanize};
use blueprint_schema::ResolvedSchema;
use blueprint_validate::{FieldRule, ValidationSchema};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Saved successfully!";
pub const DEFAULT_SUBMITTING_TEXT: &str = "Submitting...";
pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 1500;

/// Behavior switches for the vanilla controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControllerOptions {
    pub method: String,
    pub validate_on_blur: bool,
    pub reset_on_success: bool,
    pub success_message: String,
    pub submitting_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_on_success: Option<String>,
    pub redirect_delay: u64,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            method: Method::POST.to_string(),
            validate_on_blur: false,
            reset_on_success: true,
            success_message: DEFAULT_SUCCESS_MESSAGE.into(),
            submitting_text: DEFAULT_SUBMITTING_TEXT.into(),
            redirect_on_success: None,
            redirect_delay: DEFAULT_REDIRECT_DELAY_MS,
        }
    }
}

impl ControllerOptions {
    /// Unknown verbs fall back to POST.
    pub fn http_method(&self) -> Method {
        match Method::from_bytes(self.method.to_ascii_uppercase().as_bytes()) {
            Ok(method) => method,
            Err(_) => {
                warn!(method = %self.method, "invalid form method, using POST");
                Method::POST
            }
        }
    }

    /// Overlay the keys present in `patch`; keys it leaves out keep their
    /// current value.
    pub fn merge(&mut self, patch: &Map<String, Value>) -> Result<(), serde_json::Error> {
        let mut current = match serde_json::to_value(&*self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in patch {
            current.insert(key.clone(), value.clone());
        }
        *self = serde_json::from_value(Value::Object(current))?;
        Ok(())
    }
}

/// Everything the vanilla controller needs for one form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfig {
    pub form_id: String,
    pub fields: Vec<FieldRule>,
    pub endpoint: String,
    #[serde(default)]
    pub nonce: String,
    #[serde(default)]
    pub options: ControllerOptions,
}

impl ControllerConfig {
    pub fn new(form_id: impl Into<String>, fields: &[FieldDefinition], endpoint: impl Into<String>) -> Self {
        Self {
            form_id: form_id.into(),
            fields: ValidationSchema::from_fields(fields).fields().to_vec(),
            endpoint: endpoint.into(),
            nonce: String::new(),
            options: ControllerOptions::default(),
        }
    }

    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = nonce.into();
        self
    }

    pub fn options(mut self, options: ControllerOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

impl FormMode {
    pub fn method(&self) -> Method {
        match self {
            FormMode::Create => Method::POST,
            FormMode::Edit(_) => Method::PUT,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            FormMode::Create => "Create",
            FormMode::Edit(_) => "Edit",
        }
    }

    pub fn record_id(&self) -> Option<&str> {
        match self {
            FormMode::Create => None,
            FormMode::Edit(id) => Some(id),
        }
    }

    fn submitting_text(&self) -> &'static str {
        match self {
            FormMode::Create => "Creating...",
            FormMode::Edit(_) => "Saving...",
        }
    }

    /// Collection endpoint, or the record's own URL when editing.
    pub fn target(&self, endpoint: &str) -> String {
        match self {
            FormMode::Create => endpoint.to_string(),
            FormMode::Edit(id) => format!("{}/{id}", endpoint.trim_end_matches('/')),
        }
    }
}

/// Fields in order, hidden ones skipped, followed by the submit button and
/// the message region.
pub fn render_form(fields: &[FieldDefinition], data: Option<&Map<String, Value>>) -> String {
    form_markup(None, fields, data, "Submit")
}

fn form_markup(
    form_id: Option<&str>,
    fields: &[FieldDefinition],
    data: Option<&Map<String, Value>>,
    submit_text: &str,
) -> String {
    let mut html = match form_id {
        Some(id) => format!(r#"<form id="{}" class="bp-form bp-form-js">"#, escape_html(id)),
        None => r#"<form class="bp-form">"#.to_string(),
    };
    for field in fields.iter().filter(|f| !f.is_hidden()) {
        let value = data.and_then(|d| d.get(field.key()));
        html.push_str(&field.render(value));
    }
    let _ = write!(
        html,
        r#"<button type="submit" class="bp-submit">{}</button><div class="bp-form-message"></div></form>"#,
        escape_html(submit_text)
    );
    html
}

pub fn form_id(key: &str) -> String {
    format!("bp-{key}-form")
}

/// The controller config a create/edit page embeds for `schema`.
pub fn page_config(schema: &ResolvedSchema, mode: &FormMode, nonce: &str) -> ControllerConfig {
    let verb = mode.verb();
    let options = ControllerOptions {
        method: mode.method().to_string(),
        reset_on_success: *mode == FormMode::Create,
        success_message: format!("{verb} successful!"),
        submitting_text: mode.submitting_text().into(),
        ..ControllerOptions::default()
    };
    ControllerConfig::new(
        form_id(&schema.key),
        &schema.resolved_fields,
        mode.target(schema.endpoint().unwrap_or_default()),
    )
    .nonce(nonce)
    .options(options)
}

/// A complete create or edit page for one schema.
pub fn render_form_page(
    schema: &ResolvedSchema,
    mode: &FormMode,
    data: Option<&Map<String, Value>>,
    nonce: &str,
) -> String {
    if schema.resolved_fields.is_empty() {
        return format!(
            r#"<div class="bp-form-container"><p>No fields defined for {} collection.</p></div>"#,
            escape_html(&schema.key)
        );
    }

    let config = page_config(schema, mode, nonce);
    let json = serde_json::to_string(&config)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/");
    let verb = mode.verb();

    let mut html = String::from(r#"<div class="bp-form-container">"#);
    let _ = write!(html, "<h1>{verb} {}</h1>", escape_html(&humanize(&schema.key)));
    html.push_str(&form_markup(
        Some(&config.form_id),
        &schema.resolved_fields,
        data,
        verb,
    ));
    html.push_str("</div>");
    let _ = write!(
        html,
        r#"<script type="application/json" id="{}-config">{json}</script>"#,
        escape_html(&config.form_id)
    );
    html
}

/// Placeholder element a dynamic form mounts on. Extra attributes come
/// first; an empty value renders as a bare attribute.
pub fn mount_point(schema: &str, record_id: Option<&str>, attributes: &[(&str, &str)]) -> String {
    if schema.trim().is_empty() {
        return "<p><strong>Blueprint Form Error:</strong> No schema specified.</p>".to_string();
    }

    let mut attrs: Vec<(&str, &str)> = attributes
        .iter()
        .filter(|(name, _)| !name.starts_with("data-blueprint") && *name != "data-schema" && *name != "data-record-id")
        .copied()
        .collect();
    attrs.push(("data-blueprint-form", ""));
    attrs.push(("data-schema", schema));
    if let Some(id) = record_id {
        attrs.push(("data-record-id", id));
    }

    let mut html = String::from("<div");
    for (name, value) in attrs {
        if value.is_empty() {
            let _ = write!(html, " {name}");
        } else {
            let _ = write!(html, r#" {name}="{}""#, escape_html(value));
        }
    }
    html.push_str("></div>");
    html
}
