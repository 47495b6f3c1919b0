use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FieldError;

/// Typed attribute set shared by every field kind.
///
/// Every attribute is optional so the same struct doubles as a sparse
/// override when a schema patches inferred defaults. Keys the engine does not
/// recognize land in `extra` and round-trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_per_page: Option<u32>,
    #[serde(rename = "sortable_children", skip_serializing_if = "Option::is_none")]
    pub sortable_children: Option<SortableChildrenConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

macro_rules! overlay {
    ($target:ident, $source:ident; $($field:ident),+ $(,)?) => {
        $(
            if $source.$field.is_some() {
                $target.$field = $source.$field.clone();
            }
        )+
    };
}

impl FieldAttributes {
    /// Shallow merge: every attribute `other` sets replaces the current one.
    pub fn merge(&mut self, other: &FieldAttributes) {
        overlay!(self, other;
            label, required, default, placeholder, help_text, min_length,
            max_length, min, max, step, options, append, prepend, pattern,
            pattern_message, hidden, rows, multiple, relation, roles, post_type,
            post_status, results_per_page, sortable_children,
        );
        for (key, value) in &other.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.unwrap_or(false)
    }

    /// Option values in declaration order.
    pub fn option_values(&self) -> Option<Vec<String>> {
        self.options
            .as_ref()
            .map(|options| options.iter().map(FieldOption::value).collect())
    }
}

/// One entry of a choice list: either a bare string used as both label and
/// value, or an explicit `{ label, value }` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldOption {
    Bare(String),
    Labeled { label: String, value: Value },
}

impl FieldOption {
    pub fn labeled(label: impl Into<String>, value: impl Into<Value>) -> Self {
        FieldOption::Labeled {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FieldOption::Bare(s) => s,
            FieldOption::Labeled { label, .. } => label,
        }
    }

    pub fn value(&self) -> String {
        match self {
            FieldOption::Bare(s) => s.clone(),
            FieldOption::Labeled { value, .. } => match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        }
    }
}

impl From<&str> for FieldOption {
    fn from(s: &str) -> Self {
        FieldOption::Bare(s.to_string())
    }
}

impl From<String> for FieldOption {
    fn from(s: String) -> Self {
        FieldOption::Bare(s)
    }
}

/// Where a relation field loads its choices from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelationConfig {
    pub endpoint: Option<String>,
    pub label_field: String,
    pub value_field: String,
    pub placeholder: String,
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, String>,
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            label_field: "title".into(),
            value_field: "id".into(),
            placeholder: "Select an option...".into(),
            per_page: None,
            filters: BTreeMap::new(),
        }
    }
}

/// Configuration of a `sortable_children` field: a list of child records
/// loaded from `endpoint?{filter_by}={parent id}` and re-ordered in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SortableChildrenSpec")]
pub struct SortableChildrenConfig {
    pub endpoint: String,
    pub update_endpoint: String,
    pub filter_by: String,
    pub label_field: String,
    pub position_field: String,
    pub id_field: String,
}

impl SortableChildrenConfig {
    pub fn new(
        endpoint: impl Into<String>,
        filter_by: impl Into<String>,
    ) -> Result<Self, FieldError> {
        let endpoint = endpoint.into();
        let filter_by = filter_by.into();
        if endpoint.trim().is_empty() {
            return Err(FieldError::InvalidSortableChildren("an endpoint"));
        }
        if filter_by.trim().is_empty() {
            return Err(FieldError::InvalidSortableChildren("a filterBy parameter"));
        }
        Ok(Self {
            update_endpoint: endpoint.clone(),
            endpoint,
            filter_by,
            label_field: "title".into(),
            position_field: "position".into(),
            id_field: "id".into(),
        })
    }

    pub fn update_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.update_endpoint = endpoint.into();
        self
    }

    pub fn label_field(mut self, field: impl Into<String>) -> Self {
        self.label_field = field.into();
        self
    }

    pub fn position_field(mut self, field: impl Into<String>) -> Self {
        self.position_field = field.into();
        self
    }

    pub fn id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SortableChildrenSpec {
    #[serde(default)]
    endpoint: String,
    update_endpoint: Option<String>,
    #[serde(default)]
    filter_by: String,
    label_field: Option<String>,
    position_field: Option<String>,
    id_field: Option<String>,
}

impl TryFrom<SortableChildrenSpec> for SortableChildrenConfig {
    type Error = FieldError;

    fn try_from(spec: SortableChildrenSpec) -> Result<Self, Self::Error> {
        let mut config = SortableChildrenConfig::new(spec.endpoint, spec.filter_by)?;
        if let Some(endpoint) = spec.update_endpoint {
            config.update_endpoint = endpoint;
        }
        if let Some(field) = spec.label_field {
            config.label_field = field;
        }
        if let Some(field) = spec.position_field {
            config.position_field = field;
        }
        if let Some(field) = spec.id_field {
            config.id_field = field;
        }
        Ok(config)
    }
}
