use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use blueprint_schema::ResolveError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Schema not found")]
    NotFound(String),
    #[error(transparent)]
    Resolve(ResolveError),
    #[error("invalid request body: {0}")]
    Body(String),
}

impl From<ResolveError> for ApiError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::SchemaNotFound(key) => ApiError::NotFound(key),
            other => ApiError::Resolve(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Resolve(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Body(_) => StatusCode::BAD_REQUEST,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
