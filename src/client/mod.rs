//!
//! confession board HTTP client
//! -----------------------------
//! Typed wrapper over the `/api/confessions` routes used by the `confess`
//! terminal binary. Mutating calls carry the bearer token; without one they
//! fail locally and no request is sent.

use anyhow::{anyhow, Context, Result};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::json;

use crate::confessions::{Confession, ConfessionPage};

pub mod format;

pub use format::{format_relative, render_confession, render_page, wrap_text};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Error body returned by the server for every failed call.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct ConfessionClient {
    base: Url,
    http: reqwest::Client,
    token: Option<String>,
}

impl ConfessionClient {
    pub fn new(base: &str, token: Option<String>) -> Result<Self> {
        let base = Url::parse(base).context("invalid base URL")?;
        let http = reqwest::Client::builder().build()?;
        let token = token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        Ok(Self { base, http, token })
    }

    pub fn has_token(&self) -> bool { self.token.is_some() }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(self.http.request(method, self.url(path)?))
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| anyhow!("sign in first: pass --token or set CONFESS_TOKEN"))?;
        Ok(self.request(method, path)?.bearer_auth(token))
    }

    pub async fn list(&self, page: u64, limit: u64) -> Result<ConfessionPage> {
        let resp = self
            .request(Method::GET, "/api/confessions")?
            .query(&[("page", page), ("limit", limit)])
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Confession> {
        let resp = self.request(Method::GET, &format!("/api/confessions/{id}"))?.send().await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn create(&self, text: &str) -> Result<Confession> {
        let resp = self
            .authed(Method::POST, "/api/confessions")?
            .json(&json!({ "text": text }))
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn update(&self, id: &str, text: &str) -> Result<Confession> {
        let resp = self
            .authed(Method::PUT, &format!("/api/confessions/{id}"))?
            .json(&json!({ "text": text }))
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let resp = self.authed(Method::DELETE, &format!("/api/confessions/{id}"))?.send().await?;
        check(resp).await?;
        Ok(())
    }
}

/// Pass successful responses through; turn anything else into an error
/// carrying the server's message.
async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(anyhow!("HTTP {}: {}", status.as_u16(), describe_failure(&body)))
}

pub fn describe_failure(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody { message: Some(m), .. }) => m,
        Ok(ApiErrorBody { error, message: None }) => error,
        Err(_) if body.trim().is_empty() => "no response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
