use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

const MAX_BODY: usize = 64 * 1024;

/// Hand the request to the schema gateway unchanged.
pub async fn forward(State(state): State<AppState>, req: Request) -> Result<Response, ApiError> {
    let (parts, body) = req.into_parts();
    let bytes = to_bytes(body, MAX_BODY)
        .await
        .map_err(|e| ApiError::Body(e.to_string()))?;

    let reply = state
        .gateway
        .handle(axum::http::Request::from_parts(parts, bytes.to_vec()));
    let (parts, body) = reply.into_parts();
    Ok(Response::from_parts(parts, Body::from(body)))
}
