use std::collections::BTreeMap;

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// The request never produced a response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("server responded with {status}")]
    Status { status: StatusCode, body: Value },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid request: {0}")]
    Request(#[from] http::Error),

    #[error("invalid schema key {0:?}")]
    InvalidKey(String),
}

impl ApiError {
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// A 404, or a key the server could never have registered.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::InvalidKey(_)) || self.status_code() == Some(StatusCode::NOT_FOUND)
    }

    /// The server's own top-level message (`message`, then `error`).
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { body, .. } => body
                .get("message")
                .or_else(|| body.get("error"))
                .and_then(Value::as_str),
            _ => None,
        }
    }

    /// Per-field messages from an `errors` object. A list keeps its first
    /// entry.
    pub fn field_errors(&self) -> BTreeMap<String, String> {
        let ApiError::Status { body, .. } = self else {
            return BTreeMap::new();
        };
        let Some(errors) = body.get("errors").and_then(Value::as_object) else {
            return BTreeMap::new();
        };
        errors
            .iter()
            .filter_map(|(field, value)| {
                let message = match value {
                    Value::String(s) => s.clone(),
                    Value::Array(items) => items.first()?.as_str()?.to_string(),
                    Value::Null => return None,
                    other => other.to_string(),
                };
                Some((field.clone(), message))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_server_messages_and_field_errors() {
        let err = ApiError::Status {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: json!({
                "message": "Validation failed",
                "errors": { "title": ["Title is required", "too short"], "email": "bad" }
            }),
        };
        assert_eq!(err.server_message(), Some("Validation failed"));
        let fields = err.field_errors();
        assert_eq!(fields["title"], "Title is required");
        assert_eq!(fields["email"], "bad");
        assert!(!err.is_not_found());
    }

    #[test]
    fn error_key_is_a_message_too() {
        let err = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            body: json!({ "error": "Schema not found" }),
        };
        assert!(err.is_not_found());
        assert_eq!(err.server_message(), Some("Schema not found"));
        assert!(err.field_errors().is_empty());
    }
}
