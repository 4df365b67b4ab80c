use axum::Json;
use serde_json::{Value, json};

/// Liveness check, no authentication.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
