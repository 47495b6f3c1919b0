mod forms;
mod health;
mod schemas;

use axum::Router;
use axum::routing::{any, get};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/schemas", any(schemas::forward))
        .route("/schemas/{key}", any(schemas::forward))
        .route("/forms/{key}", get(forms::create_page))
        .route("/forms/{key}/{id}", get(forms::edit_page))
}
