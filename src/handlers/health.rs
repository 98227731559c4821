//! Health and readiness handlers

use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::constants::{APP_NAME, APP_VERSION};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
}

pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: APP_VERSION,
        timestamp: chrono::Utc::now().timestamp(),
    })
}

/// Readiness banner at the root. The model is loaded before the router is
/// built, so reaching this handler means the pipeline is in memory.
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": format!("{APP_NAME} ready, model loaded in memory")
    }))
}
