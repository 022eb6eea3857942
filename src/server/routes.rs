use std::collections::HashMap;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::confessions::PageRequest;
use crate::identity::RequestContext;
use super::AppState;

/// Body of create and update requests.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TextPayload {
    #[serde(default)]
    pub text: Option<String>,
}

/// An unreadable body is treated like a missing `text` field so that the
/// operation, not the extractor, decides which error wins.
fn payload_text(body: Result<Json<TextPayload>, JsonRejection>) -> Option<String> {
    body.ok().and_then(|Json(p)| p.text)
}

/// An undecodable path segment cannot name a stored confession; an empty id
/// lets the operation report it as not found after its own checks.
fn path_id(id: Result<Path<String>, PathRejection>) -> String {
    id.map(|Path(id)| id).unwrap_or_default()
}

pub async fn list_confessions(
    State(state): State<AppState>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Response {
    let req = match query {
        Ok(Query(params)) => PageRequest::from_query(&params),
        Err(_) => PageRequest::default(),
    };
    match state.confessions.list(req).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => state.fail(e),
    }
}

pub async fn get_confession(State(state): State<AppState>, id: Result<Path<String>, PathRejection>) -> Response {
    match state.confessions.get(&path_id(id)).await {
        Ok(c) => Json(c).into_response(),
        Err(e) => state.fail(e),
    }
}

pub async fn create_confession(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<TextPayload>, JsonRejection>,
) -> Response {
    let text = payload_text(body);
    match state.confessions.create(ctx.subject(), text.as_deref()).await {
        Ok(c) => (StatusCode::CREATED, Json(c)).into_response(),
        Err(e) => state.fail(e),
    }
}

pub async fn update_confession(
    State(state): State<AppState>,
    ctx: RequestContext,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<TextPayload>, JsonRejection>,
) -> Response {
    let text = payload_text(body);
    match state.confessions.update(ctx.subject(), &path_id(id), text.as_deref()).await {
        Ok(c) => Json(c).into_response(),
        Err(e) => state.fail(e),
    }
}

pub async fn delete_confession(
    State(state): State<AppState>,
    ctx: RequestContext,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    match state.confessions.delete(ctx.subject(), &path_id(id)).await {
        Ok(()) => Json(serde_json::json!({ "message": "Confession deleted successfully" })).into_response(),
        Err(e) => state.fail(e),
    }
}
