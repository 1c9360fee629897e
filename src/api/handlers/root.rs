use axum::{Json, response::IntoResponse};
use serde_json::json;

// axum handler for /ping
pub async fn ping() -> impl IntoResponse {
    Json(json!({ "message": "pong" }))
}
