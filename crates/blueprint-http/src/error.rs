use blueprint_schema::ResolveError;
use http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("not found")]
    RouteNotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("Schema not found")]
    SchemaNotFound(String),

    #[error(transparent)]
    Resolve(ResolveError),

    #[error("failed to encode response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::RouteNotFound | GatewayError::SchemaNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::Resolve(_) | GatewayError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ResolveError> for GatewayError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::SchemaNotFound(key) => GatewayError::SchemaNotFound(key),
            other => GatewayError::Resolve(other),
        }
    }
}
