use std::convert::Infallible;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};

use super::verifier::{Credentials, SharedVerifier};
use super::SubjectId;

/// Per-request authentication outcome. Absence of a subject is not a failure
/// here; each operation decides whether it needs one.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub subject: Option<SubjectId>,
}

impl RequestContext {
    pub fn anonymous() -> Self { Self { subject: None } }

    pub fn subject(&self) -> Option<&SubjectId> { self.subject.as_ref() }
}

/// Pull a bearer token out of the `Authorization` header, if any.
pub fn bearer_credentials(headers: &HeaderMap) -> Option<Credentials> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = raw.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") { return None; }
    let token = token.trim();
    if token.is_empty() { None } else { Some(Credentials::Bearer(token.to_string())) }
}

impl<S> FromRequestParts<S> for RequestContext
where
    SharedVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(creds) = bearer_credentials(&parts.headers) else {
            return Ok(RequestContext::anonymous());
        };
        let verifier = SharedVerifier::from_ref(state);
        let subject = verifier.verify(&creds).await;
        if subject.is_none() {
            tracing::debug!(target: "auth", "bearer token rejected; continuing unauthenticated");
        }
        Ok(RequestContext { subject })
    }
}
