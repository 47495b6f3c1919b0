//! Field components that fetch their own data: relation options, user and
//! post pickers, and the sortable child list.
//!
//! Each fetch is split into `begin` (issue a token and build the URL) and
//! `finish` (apply the response). A response whose token is no longer the
//! latest is dropped, so a slow early search never overwrites a later one.

use std::cmp::Ordering;

use blueprint_field::markup::value_text;
use blueprint_field::{FieldDefinition, FieldKind, RelationConfig, SortableChildrenConfig, rules};
use http::Method;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::api::{ApiClient, with_query};
use crate::error::ApiError;

pub const NO_RELATION_ENDPOINT: &str = "No endpoint configured for relation field";
pub const ITEMS_NOT_A_LIST: &str = "API response items is not an array";
pub const SAVE_RECORD_FIRST: &str = "Save this record first to manage its children.";
pub const MIN_SEARCH_CHARS: usize = 2;
pub const DEFAULT_RESULTS_PER_PAGE: u32 = 10;

#[derive(Debug, Clone, Default)]
pub struct RequestTokens {
    latest: u64,
}

impl RequestTokens {
    /// Issue a new token, invalidating every earlier one.
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_current(&self, token: u64) -> bool {
        token == self.latest
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuxState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    pub token: u64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// Text of a label field; WordPress-style `{ "rendered": ... }` objects
/// are unwrapped.
fn label_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::Object(map)) => value_text(map.get("rendered")),
        other => value_text(other),
    }
}

/// `data.items` of a collection listing.
fn collection_items(body: &Value) -> Option<&Vec<Value>> {
    body.pointer("/data/items").and_then(Value::as_array)
}

fn stale(field: &str, token: u64) -> bool {
    debug!(field, token, "stale response dropped");
    false
}

pub struct RelationOptions {
    field: String,
    config: RelationConfig,
    tokens: RequestTokens,
    state: AuxState,
    options: Vec<Choice>,
}

impl RelationOptions {
    pub fn new(field: &FieldDefinition) -> Self {
        Self {
            field: field.key().to_string(),
            config: field.attributes().relation.clone().unwrap_or_default(),
            tokens: RequestTokens::default(),
            state: AuxState::Idle,
            options: Vec::new(),
        }
    }

    pub fn state(&self) -> &AuxState {
        &self.state
    }

    pub fn options(&self) -> &[Choice] {
        &self.options
    }

    pub fn placeholder(&self) -> &str {
        &self.config.placeholder
    }

    pub fn begin(&mut self, client: &ApiClient) -> Option<PendingFetch> {
        let Some(endpoint) = self.config.endpoint.as_deref().map(|e| client.resolve(e)) else {
            self.state = AuxState::Failed(NO_RELATION_ENDPOINT.into());
            return None;
        };
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(per_page) = self.config.per_page {
            query.push(("per_page", per_page.to_string()));
        }
        for (key, value) in &self.config.filters {
            query.push((key.as_str(), value.clone()));
        }
        match with_query(&endpoint, &query) {
            Ok(url) => {
                self.state = AuxState::Loading;
                Some(PendingFetch {
                    token: self.tokens.issue(),
                    url,
                })
            }
            Err(err) => {
                self.state = AuxState::Failed(err.to_string());
                None
            }
        }
    }

    /// Returns `false` when the response was stale and ignored.
    pub fn finish(&mut self, token: u64, result: Result<Value, ApiError>) -> bool {
        if !self.tokens.is_current(token) {
            return stale(&self.field, token);
        }
        match result {
            Ok(body) => match collection_items(&body) {
                Some(items) => {
                    self.options = items
                        .iter()
                        .map(|item| Choice {
                            value: value_text(item.get(&self.config.value_field)),
                            label: label_text(item.get(&self.config.label_field)),
                        })
                        .collect();
                    self.state = AuxState::Ready;
                }
                None => self.state = AuxState::Failed(ITEMS_NOT_A_LIST.into()),
            },
            Err(err) => {
                warn!(field = %self.field, error = %err, "relation options failed to load");
                self.state = AuxState::Failed(err.to_string());
            }
        }
        true
    }

    pub fn load(&mut self, client: &ApiClient) {
        if let Some(fetch) = self.begin(client) {
            let result = client.get(&fetch.url);
            self.finish(fetch.token, result);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerKind {
    User { roles: Vec<String> },
    Post { post_type: String, status: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickerItem {
    pub id: Value,
    pub label: String,
    pub detail: Option<String>,
}

/// Search-as-you-type picker over users or posts.
pub struct SearchPicker {
    field: String,
    kind: PickerKind,
    per_page: u32,
    tokens: RequestTokens,
    state: AuxState,
    results: Vec<PickerItem>,
}

impl SearchPicker {
    pub fn new(field: &FieldDefinition) -> Self {
        let attrs = field.attributes();
        let kind = match field.kind() {
            FieldKind::User => PickerKind::User {
                roles: attrs.roles.clone().unwrap_or_default(),
            },
            _ => PickerKind::Post {
                post_type: attrs.post_type.clone().unwrap_or_else(|| "posts".into()),
                status: attrs.post_status.clone(),
            },
        };
        Self {
            field: field.key().to_string(),
            kind,
            per_page: attrs.results_per_page.unwrap_or(DEFAULT_RESULTS_PER_PAGE),
            tokens: RequestTokens::default(),
            state: AuxState::Idle,
            results: Vec::new(),
        }
    }

    pub fn kind(&self) -> &PickerKind {
        &self.kind
    }

    pub fn state(&self) -> &AuxState {
        &self.state
    }

    pub fn results(&self) -> &[PickerItem] {
        &self.results
    }

    /// Users list without a term; posts need at least two characters.
    /// A term that is too short clears the results and invalidates any
    /// search still in flight.
    pub fn begin(&mut self, client: &ApiClient, term: &str) -> Result<Option<PendingFetch>, ApiError> {
        let term = term.trim();
        let long_enough = term.chars().count() >= MIN_SEARCH_CHARS;
        let mut query = vec![("per_page", self.per_page.to_string())];
        let path = match &self.kind {
            PickerKind::User { roles } => {
                if long_enough {
                    query.push(("search", term.to_string()));
                }
                if !roles.is_empty() {
                    query.push(("roles", roles.join(",")));
                }
                "users".to_string()
            }
            PickerKind::Post { post_type, status } => {
                if !long_enough {
                    self.tokens.issue();
                    self.results.clear();
                    self.state = AuxState::Idle;
                    return Ok(None);
                }
                query.push(("search", term.to_string()));
                if let Some(status) = status {
                    query.push(("status", status.clone()));
                }
                post_type.clone()
            }
        };
        let url = with_query(&client.url(&path), &query)?;
        self.state = AuxState::Loading;
        Ok(Some(PendingFetch {
            token: self.tokens.issue(),
            url,
        }))
    }

    pub fn finish(&mut self, token: u64, result: Result<Value, ApiError>) -> bool {
        if !self.tokens.is_current(token) {
            return stale(&self.field, token);
        }
        let body = match result {
            Ok(body) => body,
            Err(err) => {
                warn!(field = %self.field, error = %err, "search failed");
                self.results.clear();
                self.state = AuxState::Failed(err.to_string());
                return true;
            }
        };
        let items = match &body {
            Value::Array(items) => Some(items),
            other => collection_items(other),
        };
        let Some(items) = items else {
            self.results.clear();
            self.state = AuxState::Failed(ITEMS_NOT_A_LIST.into());
            return true;
        };
        self.results = items.iter().map(|item| self.item(item)).collect();
        self.state = AuxState::Ready;
        true
    }

    fn item(&self, item: &Value) -> PickerItem {
        let id = item.get("id").cloned().unwrap_or(Value::Null);
        match self.kind {
            PickerKind::User { .. } => PickerItem {
                id,
                label: label_text(item.get("name")),
                detail: item.get("email").and_then(Value::as_str).map(String::from),
            },
            PickerKind::Post { .. } => {
                let title = label_text(item.get("title"));
                PickerItem {
                    id,
                    label: if title.is_empty() { "Untitled".into() } else { title },
                    detail: item.get("status").and_then(Value::as_str).map(String::from),
                }
            }
        }
    }

    pub fn search(&mut self, client: &ApiClient, term: &str) {
        match self.begin(client, term) {
            Ok(Some(fetch)) => {
                let result = client.get(&fetch.url);
                self.finish(fetch.token, result);
            }
            Ok(None) => {}
            Err(err) => self.state = AuxState::Failed(err.to_string()),
        }
    }
}

/// Child records of the current record, ordered by their position field.
pub struct ChildList {
    field: String,
    config: SortableChildrenConfig,
    record_id: Option<String>,
    tokens: RequestTokens,
    state: AuxState,
    items: Vec<Map<String, Value>>,
    has_changes: bool,
}

impl ChildList {
    /// `None` when the field carries no sortable-children config.
    pub fn new(field: &FieldDefinition, record_id: Option<&str>) -> Option<Self> {
        let config = field.attributes().sortable_children.clone()?;
        Some(Self {
            field: field.key().to_string(),
            config,
            record_id: record_id.map(String::from),
            tokens: RequestTokens::default(),
            state: AuxState::Idle,
            items: Vec::new(),
            has_changes: false,
        })
    }

    pub fn state(&self) -> &AuxState {
        &self.state
    }

    pub fn items(&self) -> &[Map<String, Value>] {
        &self.items
    }

    pub fn has_changes(&self) -> bool {
        self.has_changes
    }

    /// Shown instead of the list while the parent has no id.
    pub fn notice(&self) -> Option<&'static str> {
        self.record_id.is_none().then_some(SAVE_RECORD_FIRST)
    }

    pub fn labels(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|item| label_text(item.get(&self.config.label_field)))
            .collect()
    }

    fn position(&self, item: &Map<String, Value>) -> f64 {
        item.get(&self.config.position_field)
            .and_then(rules::as_number)
            .unwrap_or(0.0)
    }

    pub fn begin(&mut self, client: &ApiClient) -> Result<Option<PendingFetch>, ApiError> {
        let Some(record_id) = &self.record_id else {
            return Ok(None);
        };
        let url = with_query(
            &client.resolve(&self.config.endpoint),
            &[(self.config.filter_by.as_str(), record_id.clone())],
        )?;
        self.state = AuxState::Loading;
        Ok(Some(PendingFetch {
            token: self.tokens.issue(),
            url,
        }))
    }

    pub fn finish(&mut self, token: u64, result: Result<Value, ApiError>) -> bool {
        if !self.tokens.is_current(token) {
            return stale(&self.field, token);
        }
        match result {
            Ok(body) => {
                let mut items: Vec<Map<String, Value>> = collection_items(&body)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|item| item.as_object().cloned())
                            .collect()
                    })
                    .unwrap_or_default();
                items.sort_by(|a, b| {
                    self.position(a)
                        .partial_cmp(&self.position(b))
                        .unwrap_or(Ordering::Equal)
                });
                self.items = items;
                self.has_changes = false;
                self.state = AuxState::Ready;
            }
            Err(err) => {
                warn!(field = %self.field, error = %err, "children failed to load");
                self.state = AuxState::Failed(err.to_string());
            }
        }
        true
    }

    pub fn load(&mut self, client: &ApiClient) {
        match self.begin(client) {
            Ok(Some(fetch)) => {
                let result = client.get(&fetch.url);
                self.finish(fetch.token, result);
            }
            Ok(None) => {}
            Err(err) => self.state = AuxState::Failed(err.to_string()),
        }
    }

    /// Move one item; indices out of range are ignored.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from >= self.items.len() || to >= self.items.len() || from == to {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        self.has_changes = true;
        true
    }

    /// PATCH the 1-indexed position of every item whose position changed,
    /// then reload. Returns the number of items updated.
    pub fn save(&mut self, client: &ApiClient) -> Result<usize, ApiError> {
        let base = client
            .resolve(&self.config.update_endpoint)
            .trim_end_matches('/')
            .to_string();
        let mut updated = 0;
        for (index, item) in self.items.iter().enumerate() {
            let position = index + 1;
            if self.position(item) == position as f64 {
                continue;
            }
            let id = value_text(item.get(&self.config.id_field));
            let mut body = Map::new();
            body.insert(self.config.position_field.clone(), Value::from(position));
            let body = Value::Object(body);
            if let Err(err) = client.send_json(Method::PATCH, &format!("{base}/{id}"), &body) {
                warn!(field = %self.field, id = %id, error = %err, "position update failed");
                self.state = AuxState::Failed(err.to_string());
                return Err(err);
            }
            updated += 1;
        }
        self.load(client);
        self.has_changes = false;
        Ok(updated)
    }

    /// Throw away local reordering.
    pub fn cancel(&mut self, client: &ApiClient) {
        self.load(client);
        self.has_changes = false;
    }
}

/// A field that loads its own data, dispatched by kind.
pub enum AuxField {
    Relation(RelationOptions),
    Picker(SearchPicker),
    Children(ChildList),
}

impl AuxField {
    pub fn for_field(field: &FieldDefinition, record_id: Option<&str>) -> Option<Self> {
        match field.kind() {
            FieldKind::Relation => Some(AuxField::Relation(RelationOptions::new(field))),
            FieldKind::User | FieldKind::PostObject => Some(AuxField::Picker(SearchPicker::new(field))),
            FieldKind::SortableChildren => ChildList::new(field, record_id).map(AuxField::Children),
            _ => None,
        }
    }

    pub fn state(&self) -> &AuxState {
        match self {
            AuxField::Relation(r) => r.state(),
            AuxField::Picker(p) => p.state(),
            AuxField::Children(c) => c.state(),
        }
    }

    /// Initial load. Pickers wait for a search term.
    pub fn load(&mut self, client: &ApiClient) {
        match self {
            AuxField::Relation(r) => r.load(client),
            AuxField::Picker(_) => {}
            AuxField::Children(c) => c.load(client),
        }
    }
}
