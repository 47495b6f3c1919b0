use std::collections::BTreeMap;
use std::sync::Arc;

use blueprint_field::markup::escape_html;
use blueprint_field::{FieldAttributes, FieldDefinition, FieldKind, FieldTypeRegistry};
use blueprint_validate::{FirstErrors, ValidationSchema};
use http::Method;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::api::{self, ApiClient};
use crate::aux::AuxField;
use crate::controller::{FAILED_TO_SAVE, SubmitOutcome, TRANSPORT_FAILURE};
use crate::error::ApiError;
use crate::render::DEFAULT_SUCCESS_MESSAGE;
use crate::surface::MessageKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    LoadingSchema,
    SchemaError(String),
    SchemaReady,
    LoadingRecord,
    RecordError(String),
    FormReady,
    Submitting,
    SubmitSuccess,
}

/// The concrete component a field is drawn with. Every kind maps to one;
/// unknown type names already decoded to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Input(&'static str),
    Textarea,
    Select,
    ChoiceGroup,
    Checkbox,
    Relation,
    UserPicker,
    PostPicker,
    SortableChildren,
    Media,
    ReadOnly,
    Hidden,
}

pub fn component_for(kind: FieldKind) -> Component {
    match kind {
        FieldKind::Textarea | FieldKind::Markdown | FieldKind::Wysiwyg => Component::Textarea,
        FieldKind::Select => Component::Select,
        FieldKind::Radio | FieldKind::ButtonGroup => Component::ChoiceGroup,
        FieldKind::Checkbox | FieldKind::Boolean => Component::Checkbox,
        FieldKind::Relation => Component::Relation,
        FieldKind::User => Component::UserPicker,
        FieldKind::PostObject => Component::PostPicker,
        FieldKind::SortableChildren => Component::SortableChildren,
        FieldKind::Image | FieldKind::File | FieldKind::Gallery => Component::Media,
        FieldKind::ReadOnly => Component::ReadOnly,
        FieldKind::Hidden => Component::Hidden,
        other => Component::Input(other.input_type()),
    }
}

fn describe(err: &ApiError) -> String {
    err.server_message()
        .map(String::from)
        .unwrap_or_else(|| err.to_string())
}

/// A form driven entirely by the schema gateway: fetch the schema, fetch
/// the record when editing, validate locally, then create or update.
pub struct DynamicForm {
    client: ApiClient,
    field_types: Arc<FieldTypeRegistry>,
    schema_key: String,
    record_id: Option<String>,
    state: FormState,
    transitions: Vec<FormState>,
    name: String,
    endpoint: Option<String>,
    fields: Vec<FieldDefinition>,
    validation: ValidationSchema,
    values: Map<String, Value>,
    errors: FirstErrors,
    message: Option<(String, MessageKind)>,
    aux: BTreeMap<String, AuxField>,
}

impl DynamicForm {
    pub fn new(client: ApiClient, field_types: Arc<FieldTypeRegistry>, schema_key: impl Into<String>) -> Self {
        Self {
            client,
            field_types,
            schema_key: schema_key.into(),
            record_id: None,
            state: FormState::Idle,
            transitions: Vec::new(),
            name: String::new(),
            endpoint: None,
            fields: Vec::new(),
            validation: ValidationSchema::default(),
            values: Map::new(),
            errors: FirstErrors::new(),
            message: None,
            aux: BTreeMap::new(),
        }
    }

    /// Edit an existing record instead of creating one.
    pub fn with_record(mut self, id: impl Into<String>) -> Self {
        self.record_id = Some(id.into());
        self
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Every state entered so far, in order.
    pub fn transitions(&self) -> &[FormState] {
        &self.transitions
    }

    pub fn is_edit(&self) -> bool {
        self.record_id.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Fields the form draws, in fillable order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| !f.is_hidden())
    }

    pub fn components(&self) -> Vec<(&str, Component)> {
        self.fields()
            .map(|f| (f.key(), component_for(f.kind())))
            .collect()
    }

    pub fn validation_schema(&self) -> &ValidationSchema {
        &self.validation
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn errors(&self) -> &FirstErrors {
        &self.errors
    }

    pub fn message(&self) -> Option<(&str, MessageKind)> {
        self.message.as_ref().map(|(m, k)| (m.as_str(), *k))
    }

    pub fn aux(&self, key: &str) -> Option<&AuxField> {
        self.aux.get(key)
    }

    pub fn aux_mut(&mut self, key: &str) -> Option<&mut AuxField> {
        self.aux.get_mut(key)
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn transition(&mut self, state: FormState) {
        debug!(schema = %self.schema_key, state = ?state, "form state");
        self.transitions.push(state.clone());
        self.state = state;
    }

    /// Fetch the schema, then the record when editing. Ends in
    /// `FormReady`, `SchemaError` or `RecordError`.
    pub fn load(&mut self) {
        self.transition(FormState::LoadingSchema);
        let body = match self.client.schema(&self.schema_key) {
            Ok(body) => body,
            Err(err) => {
                let message = if err.is_not_found() {
                    format!("Schema '{}' not found.", self.schema_key)
                } else {
                    describe(&err)
                };
                warn!(schema = %self.schema_key, error = %err, "schema failed to load");
                self.transition(FormState::SchemaError(message));
                return;
            }
        };
        self.apply_schema(&body);
        self.transition(FormState::SchemaReady);

        if let Some(id) = self.record_id.clone() {
            self.transition(FormState::LoadingRecord);
            let Some(endpoint) = self.endpoint.clone() else {
                self.transition(FormState::RecordError(
                    "Schema has no collection endpoint.".into(),
                ));
                return;
            };
            let url = format!("{}/{id}", endpoint.trim_end_matches('/'));
            match self.client.get(&url) {
                Ok(body) => self.populate(api::data(body)),
                Err(err) => {
                    warn!(schema = %self.schema_key, record = %id, error = %err, "record failed to load");
                    self.transition(FormState::RecordError(describe(&err)));
                    return;
                }
            }
        }
        self.transition(FormState::FormReady);
    }

    fn apply_schema(&mut self, body: &Value) {
        self.name = body
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        self.endpoint = body
            .pointer("/collection/routes/endpoint")
            .and_then(Value::as_str)
            .map(String::from);

        let declared = body
            .get("resolvedFields")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        self.fields = declared
            .iter()
            .filter_map(|entry| {
                let key = entry.get("key").and_then(Value::as_str)?;
                let type_name = entry.get("type").and_then(Value::as_str).unwrap_or("text");
                let attributes = match entry.get("attributes") {
                    Some(raw) => serde_json::from_value::<FieldAttributes>(raw.clone()).unwrap_or_else(|e| {
                        warn!(field = key, error = %e, "unreadable field attributes ignored");
                        FieldAttributes::default()
                    }),
                    None => FieldAttributes::default(),
                };
                Some(self.field_types.create_with(type_name, key, attributes))
            })
            .collect();

        self.validation = ValidationSchema::from_fields(&self.fields);
        self.values = self.defaults();
        self.aux = self
            .fields
            .iter()
            .filter_map(|f| {
                AuxField::for_field(f, self.record_id.as_deref()).map(|aux| (f.key().to_string(), aux))
            })
            .collect();
        info!(schema = %self.schema_key, fields = self.fields.len(), "schema ready");
    }

    fn defaults(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .filter(|f| !f.kind().is_virtual())
            .map(|f| {
                let value = f.attributes().default.clone().unwrap_or(Value::Null);
                (f.key().to_string(), value)
            })
            .collect()
    }

    fn populate(&mut self, record: Value) {
        let Value::Object(record) = record else {
            return;
        };
        for field in &self.fields {
            if let Some(value) = record.get(field.key()) {
                self.values.insert(field.key().to_string(), value.clone());
            }
        }
    }

    pub fn set_value(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    pub fn clear_field_error(&mut self, key: &str) {
        self.errors.remove(key);
    }

    /// Validate one field as it loses focus.
    pub fn blur(&mut self, key: &str) -> Option<String> {
        let value = self.values.get(key).unwrap_or(&Value::Null);
        match self.validation.validate_field(key, value) {
            Some(failure) => {
                self.errors.insert(key.to_string(), failure.message.clone());
                Some(failure.message)
            }
            None => {
                self.errors.remove(key);
                None
            }
        }
    }

    /// Start the independent fetches of relation and child-list fields.
    /// A failure stays inside its own field.
    pub fn load_auxiliary(&mut self) {
        if self.state != FormState::FormReady {
            return;
        }
        for aux in self.aux.values_mut() {
            aux.load(&self.client);
        }
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        if !matches!(self.state, FormState::FormReady | FormState::SubmitSuccess) {
            return SubmitOutcome::NotReady;
        }
        self.errors.clear();
        self.message = None;

        let mut payload = match self.validation.validate(&self.values) {
            Ok(data) => data,
            Err(errors) => {
                self.errors = errors.clone();
                return SubmitOutcome::Invalid(errors);
            }
        };
        for field in self.fields.iter().filter(|f| f.is_hidden() && !f.kind().is_virtual()) {
            if let Some(value) = self.values.get(field.key()).filter(|v| !v.is_null()) {
                payload.insert(field.key().to_string(), value.clone());
            }
        }

        let Some(endpoint) = self.endpoint.clone() else {
            self.message = Some((FAILED_TO_SAVE.into(), MessageKind::Error));
            return SubmitOutcome::Failed("no collection endpoint".into());
        };
        let (method, url) = match &self.record_id {
            Some(id) => (Method::PUT, format!("{}/{id}", endpoint.trim_end_matches('/'))),
            None => (Method::POST, endpoint),
        };

        self.transition(FormState::Submitting);
        match self.client.send_json(method, &url, &Value::Object(payload)) {
            Ok(body) => {
                self.message = Some((DEFAULT_SUCCESS_MESSAGE.into(), MessageKind::Success));
                if !self.is_edit() {
                    self.values = self.defaults();
                }
                self.transition(FormState::SubmitSuccess);
                SubmitOutcome::Saved(body)
            }
            Err(err) => {
                let outcome = match &err {
                    ApiError::Status { status, body } => {
                        let message = err.server_message().unwrap_or(FAILED_TO_SAVE);
                        self.message = Some((message.to_string(), MessageKind::Error));
                        self.errors = err.field_errors();
                        SubmitOutcome::Rejected {
                            status: *status,
                            body: body.clone(),
                        }
                    }
                    _ => {
                        warn!(schema = %self.schema_key, error = %err, "submission failed");
                        self.message = Some((TRANSPORT_FAILURE.into(), MessageKind::Error));
                        SubmitOutcome::Failed(err.to_string())
                    }
                };
                self.transition(FormState::FormReady);
                outcome
            }
        }
    }

    /// Markup for the current state.
    pub fn render(&self) -> String {
        match &self.state {
            FormState::Idle | FormState::LoadingSchema | FormState::LoadingRecord => {
                r#"<div class="bp-form-loading">Loading...</div>"#.to_string()
            }
            FormState::SchemaError(message) | FormState::RecordError(message) => {
                format!(r#"<div class="bp-form-error">{}</div>"#, escape_html(message))
            }
            _ => {
                let mut html = String::from(r#"<form class="bp-form bp-dynamic-form">"#);
                for field in self.fields() {
                    html.push_str(&field.render(self.values.get(field.key())));
                }
                let label = if self.state == FormState::Submitting {
                    "Submitting..."
                } else if self.is_edit() {
                    "Update"
                } else {
                    "Create"
                };
                html.push_str(&format!(r#"<button type="submit" class="bp-submit">{label}</button>"#));
                match &self.message {
                    Some((message, kind)) => html.push_str(&format!(
                        r#"<div class="bp-form-message {}">{}</div>"#,
                        kind.class(),
                        escape_html(message)
                    )),
                    None => html.push_str(r#"<div class="bp-form-message"></div>"#),
                }
                html.push_str("</form>");
                html
            }
        }
    }
}
