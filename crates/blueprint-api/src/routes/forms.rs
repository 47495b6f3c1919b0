use axum::extract::{Path, State};
use axum::response::Html;
use blueprint_field::markup::escape_html;
use blueprint_forms::{FormMode, mount_point, render_form_page};
use blueprint_schema::{ResolvedSchema, is_valid_key};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

fn resolve(state: &AppState, key: &str) -> Result<ResolvedSchema, ApiError> {
    if !is_valid_key(key) {
        return Err(ApiError::NotFound(key.to_string()));
    }
    Ok(state.resolver().resolve(key)?)
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{body}</body></html>",
        escape_html(title)
    ))
}

/// Server-rendered create form wired to the vanilla controller.
pub async fn create_page(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Html<String>, ApiError> {
    let schema = resolve(&state, &key)?;
    debug!(schema = %key, "rendering create form");
    let body = render_form_page(&schema, &FormMode::Create, None, &state.nonce);
    Ok(page(&schema.name, &body))
}

/// Edit pages load the record client-side, so only a mount point is served.
pub async fn edit_page(
    State(state): State<AppState>,
    Path((key, id)): Path<(String, String)>,
) -> Result<Html<String>, ApiError> {
    let schema = resolve(&state, &key)?;
    debug!(schema = %key, record = %id, "rendering edit mount point");
    let body = mount_point(&schema.key, Some(&id), &[("class", "bp-dynamic-form")]);
    Ok(page(&schema.name, &body))
}
