//! Unified application error model and mapping helpers.
//! Every confession operation reports precondition failures through `AppError`;
//! the HTTP layer maps each variant to exactly one status and a short message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::storage::StoreError;

/// Message shown to callers for internal failures when details are redacted.
pub const GENERIC_INTERNAL_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    Unauthenticated { code: String, message: String },
    InvalidInput { code: String, message: String },
    NotFound { code: String, message: String },
    Forbidden { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::Unauthenticated { code, .. }
            | AppError::InvalidInput { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Unauthenticated { message, .. }
            | AppError::InvalidInput { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Forbidden { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn unauthenticated<S: Into<String>>(code: S, msg: S) -> Self { AppError::Unauthenticated { code: code.into(), message: msg.into() } }
    pub fn invalid<S: Into<String>>(code: S, msg: S) -> Self { AppError::InvalidInput { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn forbidden<S: Into<String>>(code: S, msg: S) -> Self { AppError::Forbidden { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// The canonical "no subject id" failure used by every mutating operation.
    pub fn authentication_required() -> Self {
        AppError::unauthenticated("unauthenticated", "Authentication required")
    }

    pub fn confession_not_found() -> Self {
        AppError::not_found("not_found", "Confession not found")
    }

    pub fn is_internal(&self) -> bool { matches!(self, AppError::Internal { .. }) }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::Unauthenticated { .. } => 401,
            AppError::InvalidInput { .. } => 400,
            AppError::NotFound { .. } => 404,
            AppError::Forbidden { .. } => 403,
            AppError::Internal { .. } => 500,
        }
    }

    /// JSON body for this error. Internal messages are replaced by a generic one
    /// unless `expose_internal` is set, in which case the cause is added as `detail`.
    pub fn body(&self, expose_internal: bool) -> serde_json::Value {
        if self.is_internal() {
            let mut body = serde_json::json!({
                "error": self.code_str(),
                "message": GENERIC_INTERNAL_MESSAGE,
            });
            if expose_internal {
                body["detail"] = serde_json::Value::String(self.message().to_string());
            }
            return body;
        }
        serde_json::json!({ "error": self.code_str(), "message": self.message() })
    }

    /// Build the HTTP response, choosing whether internal details may leak.
    pub fn into_http_response(self, expose_internal: bool) -> Response {
        let status = StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body(expose_internal))).into_response()
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

/// Redacted by default; the server swaps in `into_http_response` when it knows
/// the deployment environment.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_http_response(false)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => AppError::InvalidInput { code: "invalid_input".into(), message: msg },
            StoreError::Missing(_) => AppError::confession_not_found(),
            other => AppError::Internal { code: "store_error".into(), message: other.to_string() },
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
