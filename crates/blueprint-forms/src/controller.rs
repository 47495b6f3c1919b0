use std::sync::Arc;
use std::time::Duration;

use blueprint_field::FieldKind;
use blueprint_field::rules;
use blueprint_validate::{FieldRule, FirstErrors};
use http::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Number, Value, json};
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::render::{ControllerConfig, ControllerOptions};
use crate::surface::{Control, ERROR_EVENT, FormEvent, FormSurface, MessageKind, SUCCESS_EVENT};
use crate::transport::Transport;

pub const FAILED_TO_SAVE: &str = "Failed to save";
pub const TRANSPORT_FAILURE: &str = "An error occurred. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Client-side rules failed; nothing was sent.
    Invalid(FirstErrors),
    Saved(Value),
    Rejected { status: StatusCode, body: Value },
    /// No response at all, or one that could not be read.
    Failed(String),
    /// The form is not in a state that accepts a submit.
    NotReady,
}

/// Partial replacement of a controller's config. Empty strings are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigUpdate {
    pub fields: Option<Vec<FieldRule>>,
    pub endpoint: Option<String>,
    pub nonce: Option<String>,
    pub options: Option<Map<String, Value>>,
}

/// Convert a control's raw state into the value that is validated and sent.
pub fn coerce(type_name: &str, control: Control) -> Value {
    let kind = FieldKind::from_name(type_name);
    match control {
        Control::Checkbox(checked) => Value::Bool(checked),
        Control::MultiSelect(values) => Value::Array(values.into_iter().map(Value::String).collect()),
        Control::Text(text) if kind.is_boolean() => {
            Value::Bool(rules::as_bool(&Value::String(text)).unwrap_or(false))
        }
        Control::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Value::Null;
            }
            if kind.is_numeric() {
                if let Ok(n) = text.parse::<f64>() {
                    return number(n);
                }
            }
            Value::String(text.to_string())
        }
    }
}

fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Progressive enhancement for a server-rendered form: validates with the
/// shared rules, submits JSON and maps server errors onto the error slots.
pub struct FormController<S: FormSurface> {
    form_id: String,
    fields: Vec<FieldRule>,
    endpoint: String,
    options: ControllerOptions,
    client: ApiClient,
    surface: S,
}

impl<S: FormSurface> FormController<S> {
    pub fn new(config: ControllerConfig, transport: Arc<dyn Transport>, surface: S) -> Self {
        let client = ApiClient::new(transport, config.endpoint.clone()).with_nonce(config.nonce);
        Self {
            form_id: config.form_id,
            fields: config.fields,
            endpoint: config.endpoint,
            options: config.options,
            client,
            surface,
        }
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Blur validation of one field. Does nothing unless `validateOnBlur`.
    pub fn blur(&mut self, name: &str) -> Option<String> {
        if !self.options.validate_on_blur {
            return None;
        }
        let rule = self.fields.iter().find(|f| f.name == name)?;
        let control = self.surface.control(name)?;
        let value = coerce(&rule.type_name, control);
        match rule.check(&value) {
            Some(failure) => {
                self.surface.set_field_error(name, &failure.message);
                Some(failure.message)
            }
            None => {
                self.surface.clear_field_error(name);
                None
            }
        }
    }

    pub fn clear_field_error(&mut self, name: &str) {
        self.surface.clear_field_error(name);
    }

    pub fn update_config(&mut self, update: ConfigUpdate) -> Result<(), serde_json::Error> {
        if let Some(fields) = update.fields {
            self.fields = fields;
        }
        if let Some(endpoint) = update.endpoint.filter(|e| !e.is_empty()) {
            self.endpoint = endpoint;
        }
        if let Some(nonce) = update.nonce.filter(|n| !n.is_empty()) {
            self.client.set_nonce(nonce);
        }
        if let Some(patch) = update.options {
            self.options.merge(&patch)?;
        }
        Ok(())
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        self.surface.clear_errors();
        self.surface.clear_message();

        let mut data = Map::new();
        let mut errors = FirstErrors::new();
        for rule in &self.fields {
            let Some(control) = self.surface.control(&rule.name) else {
                warn!(form = %self.form_id, field = %rule.name, "field element not found");
                continue;
            };
            let value = coerce(&rule.type_name, control);
            match rule.check(&value) {
                Some(failure) => {
                    self.surface.set_field_error(&rule.name, &failure.message);
                    errors.insert(rule.name.clone(), failure.message);
                }
                None => {
                    data.insert(rule.name.clone(), value);
                }
            }
        }
        if !errors.is_empty() {
            debug!(form = %self.form_id, failed = errors.len(), "submit blocked by validation");
            return SubmitOutcome::Invalid(errors);
        }

        self.surface.set_submitting(Some(&self.options.submitting_text));
        let result = self
            .client
            .send_json(self.options.http_method(), &self.endpoint, &Value::Object(data));
        self.surface.set_submitting(None);

        match result {
            Ok(body) => {
                self.on_success(&body);
                SubmitOutcome::Saved(body)
            }
            Err(err) => self.on_error(err),
        }
    }

    fn on_success(&mut self, body: &Value) {
        self.surface
            .show_message(&self.options.success_message, MessageKind::Success);
        if self.options.reset_on_success {
            self.surface.reset();
        }
        self.surface.dispatch(FormEvent {
            name: SUCCESS_EVENT,
            detail: json!({ "result": body }),
        });
        if let Some(url) = &self.options.redirect_on_success {
            self.surface
                .redirect(url, Duration::from_millis(self.options.redirect_delay));
        }
    }

    fn on_error(&mut self, err: ApiError) -> SubmitOutcome {
        let ApiError::Status { status, .. } = &err else {
            warn!(form = %self.form_id, error = %err, "submission failed");
            self.surface.show_message(TRANSPORT_FAILURE, MessageKind::Error);
            return SubmitOutcome::Failed(err.to_string());
        };
        let status = *status;

        let message = err.server_message().unwrap_or(FAILED_TO_SAVE).to_string();
        self.surface.show_message(&message, MessageKind::Error);
        for (field, message) in err.field_errors() {
            self.surface.set_field_error(&field, &message);
        }

        let body = match err {
            ApiError::Status { body, .. } => body,
            _ => Value::Null,
        };
        self.surface.dispatch(FormEvent {
            name: ERROR_EVENT,
            detail: json!({ "result": body }),
        });
        SubmitOutcome::Rejected { status, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_by_type() {
        assert_eq!(coerce("checkbox", Control::Checkbox(true)), json!(true));
        assert_eq!(coerce("boolean", Control::Text("on".into())), json!(true));
        assert_eq!(coerce("number", Control::Text(" 12 ".into())), json!(12));
        assert_eq!(coerce("decimal", Control::Text("2.5".into())), json!(2.5));
        assert_eq!(coerce("number", Control::Text("".into())), Value::Null);
        assert_eq!(coerce("number", Control::Text("abc".into())), json!("abc"));
        assert_eq!(
            coerce("select", Control::MultiSelect(vec!["a".into(), "b".into()])),
            json!(["a", "b"])
        );
        assert_eq!(coerce("text", Control::Text("  hi ".into())), json!("hi"));
        assert_eq!(coerce("text", Control::Text("   ".into())), Value::Null);
    }
}
