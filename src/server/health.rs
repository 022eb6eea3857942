use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use super::AppState;

fn health_body(state: &AppState, message: &str) -> Value {
    json!({
        "message": message,
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": state.environment.as_str(),
    })
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(health_body(&state, "Server is running"))
}

pub async fn api_health(State(state): State<AppState>) -> Json<Value> {
    Json(health_body(&state, "API is running"))
}

pub async fn banner(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Confession API Server",
        "status": "running",
        "environment": state.environment.as_str(),
        "endpoints": {
            "health": "/health",
            "api_health": "/api/health",
            "confessions": "/api/confessions",
        },
    }))
}

pub async fn route_not_found(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found", "path": uri.path(), "method": method.as_str() })),
    )
}
