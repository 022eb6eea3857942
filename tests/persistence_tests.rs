//! Restart behaviour of the file-backed store through the HTTP surface.

use std::sync::Arc;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::tempdir;
use tower::ServiceExt;

use confessions::config::Environment;
use confessions::identity::StaticTokenVerifier;
use confessions::server::{app, AppState};
use confessions::storage::{open_store, SNAPSHOT_FILE};

async fn boot(dir: &std::path::Path) -> Result<Router> {
    let store = open_store(Some(dir)).await?;
    let verifier = Arc::new(StaticTokenVerifier::new([("t-alice", "user_alice")]));
    Ok(app(AppState::new(store, verifier, Environment::Production), &[]))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let mut req = Request::builder().method(method).uri(uri).header(header::AUTHORIZATION, "Bearer t-alice");
    let req = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            req.body(Body::from(v.to_string()))?
        }
        None => req.body(Body::empty())?,
    };
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn confessions_survive_a_restart() -> Result<()> {
    let tmp = tempdir()?;

    let first = boot(tmp.path()).await?;
    let (s, kept) = send(&first, Method::POST, "/api/confessions", Some(json!({ "text": "written before restart" }))).await?;
    assert_eq!(s, StatusCode::CREATED);
    let (_, gone) = send(&first, Method::POST, "/api/confessions", Some(json!({ "text": "deleted before restart" }))).await?;
    let (s, _) = send(&first, Method::DELETE, &format!("/api/confessions/{}", gone["id"].as_str().unwrap()), None).await?;
    assert_eq!(s, StatusCode::OK);
    let (s, edited) = send(
        &first,
        Method::PUT,
        &format!("/api/confessions/{}", kept["id"].as_str().unwrap()),
        Some(json!({ "text": "edited before restart" })),
    )
    .await?;
    assert_eq!(s, StatusCode::OK);
    drop(first);

    assert!(tmp.path().join(SNAPSHOT_FILE).exists());

    let second = boot(tmp.path()).await?;
    let (s, page) = send(&second, Method::GET, "/api/confessions", None).await?;
    assert_eq!(s, StatusCode::OK);
    assert_eq!(page["totalItems"], 1);
    assert_eq!(page["confessions"][0], edited);
    Ok(())
}

#[tokio::test]
async fn production_errors_do_not_leak_details() -> Result<()> {
    let tmp = tempdir()?;
    let app = boot(tmp.path()).await?;
    let (s, body) = send(&app, Method::GET, "/api/confessions/not-a-uuid", None).await?;
    assert_eq!(s, StatusCode::NOT_FOUND);
    assert!(body.get("detail").is_none());
    assert_eq!(body["message"], "Confession not found");
    Ok(())
}
