use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::SubjectId;
use crate::config::Config;

/// Authentication evidence carried by a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
}

/// Pluggable identity provider adapter: turns request credentials into a
/// subject id, or `None` when they are missing, expired or forged.
#[async_trait]
pub trait AuthVerifier: Send + Sync {
    async fn verify(&self, credentials: &Credentials) -> Option<SubjectId>;
}

pub type SharedVerifier = Arc<dyn AuthVerifier>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default)]
    pub iat: u64,
}

/// HS256 bearer tokens signed with a shared secret.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(iss) = issuer {
            validation.set_issuer(&[iss]);
        }
        Self { key: DecodingKey::from_secret(secret.as_bytes()), validation }
    }
}

#[async_trait]
impl AuthVerifier for JwtVerifier {
    async fn verify(&self, credentials: &Credentials) -> Option<SubjectId> {
        let Credentials::Bearer(token) = credentials;
        match decode::<Claims>(token, &self.key, &self.validation) {
            Ok(data) => SubjectId::new(data.claims.sub),
            Err(e) => {
                debug!(target: "auth", "jwt rejected: {e}");
                None
            }
        }
    }
}

/// Mint an HS256 token for `subject` valid for `ttl_secs`. Used by local
/// tooling and tests; production tokens come from the identity provider.
pub fn mint_hs256(secret: &str, subject: &str, issuer: Option<&str>, ttl_secs: u64) -> Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let claims = Claims { sub: subject.to_string(), exp: now + ttl_secs, iss: issuer.map(|s| s.to_string()), iat: now };
    Ok(encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))?)
}

/// Fixed token table, for development and tests.
#[derive(Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, SubjectId>,
}

impl StaticTokenVerifier {
    pub fn new<I, T, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, S)>,
        T: Into<String>,
        S: Into<String>,
    {
        let tokens = pairs
            .into_iter()
            .filter_map(|(t, s)| SubjectId::new(s).map(|sid| (t.into(), sid)))
            .collect();
        Self { tokens }
    }
}

#[async_trait]
impl AuthVerifier for StaticTokenVerifier {
    async fn verify(&self, credentials: &Credentials) -> Option<SubjectId> {
        let Credentials::Bearer(token) = credentials;
        self.tokens.get(token).cloned()
    }
}

/// Accepts the first subject produced by any inner verifier.
pub struct AnyOfVerifier {
    inner: Vec<SharedVerifier>,
}

impl AnyOfVerifier {
    pub fn new(inner: Vec<SharedVerifier>) -> Self { Self { inner } }
}

#[async_trait]
impl AuthVerifier for AnyOfVerifier {
    async fn verify(&self, credentials: &Credentials) -> Option<SubjectId> {
        for v in &self.inner {
            if let Some(sid) = v.verify(credentials).await {
                return Some(sid);
            }
        }
        None
    }
}

/// Assemble the verifier chain described by the configuration. With nothing
/// configured every request is anonymous: reads work, writes answer 401.
pub fn verifier_from_config(config: &Config) -> SharedVerifier {
    let mut chain: Vec<SharedVerifier> = Vec::new();
    if let Some(secret) = config.auth_secret.as_deref() {
        info!(target: "auth", "bearer JWT verification enabled (issuer={:?})", config.auth_issuer);
        chain.push(Arc::new(JwtVerifier::new(secret, config.auth_issuer.as_deref())));
    }
    if !config.dev_tokens.is_empty() {
        info!(target: "auth", "static development tokens enabled ({} subjects)", config.dev_tokens.len());
        chain.push(Arc::new(StaticTokenVerifier::new(config.dev_tokens.clone())));
    }
    if chain.is_empty() {
        warn!(target: "auth", "no identity provider configured; all requests are anonymous");
    }
    Arc::new(AnyOfVerifier::new(chain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn jwt_round_trip_and_forgery() {
        let v = JwtVerifier::new("s3cret", None);
        let tok = mint_hs256("s3cret", "user_42", None, 60).unwrap();
        assert_eq!(v.verify(&Credentials::Bearer(tok)).await, SubjectId::new("user_42"));

        let forged = mint_hs256("other", "user_42", None, 60).unwrap();
        assert!(v.verify(&Credentials::Bearer(forged)).await.is_none());
        assert!(v.verify(&Credentials::Bearer("not-a-jwt".into())).await.is_none());
    }

    #[tokio::test]
    async fn jwt_issuer_is_enforced_when_configured() {
        let v = JwtVerifier::new("k", Some("https://idp.example"));
        let good = mint_hs256("k", "u", Some("https://idp.example"), 60).unwrap();
        let bad = mint_hs256("k", "u", Some("https://evil.example"), 60).unwrap();
        assert!(v.verify(&Credentials::Bearer(good)).await.is_some());
        assert!(v.verify(&Credentials::Bearer(bad)).await.is_none());
    }

    #[tokio::test]
    async fn chain_falls_through_to_static_tokens() {
        let cfg = Config {
            auth_secret: Some("k".into()),
            dev_tokens: vec![("dev-token".into(), "alice".into())],
            ..Config::default()
        };
        let v = verifier_from_config(&cfg);
        assert_eq!(v.verify(&Credentials::Bearer("dev-token".into())).await, SubjectId::new("alice"));
        assert!(v.verify(&Credentials::Bearer("unknown".into())).await.is_none());
    }

    #[tokio::test]
    async fn empty_chain_is_anonymous() {
        let v = verifier_from_config(&Config::default());
        assert!(v.verify(&Credentials::Bearer("anything".into())).await.is_none());
    }
}
