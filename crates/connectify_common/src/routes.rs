// --- File: crates/connectify_common/src/routes.rs ---

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Creates a router containing common routes that can be used across the application.
pub fn routes() -> Router {
    Router::new().route("/health", get(health))
}
