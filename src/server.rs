//!
//! confessions HTTP server
//! ------------------------
//! This module defines the Axum-based HTTP API for the confession board.
//!
//! Responsibilities:
//! - Resolving bearer tokens into an optional subject id per request.
//! - Confession routes, served under both `/confessions` and `/api/confessions`.
//! - Health and banner endpoints, JSON 404 for unknown routes.
//! - CORS policy per environment and graceful shutdown on Ctrl+C / SIGTERM.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use axum::extract::FromRef;
use axum::http::{header::{AUTHORIZATION, CONTENT_TYPE}, HeaderValue, Method};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::{Config, Environment};
use crate::confessions::ConfessionService;
use crate::error::AppError;
use crate::identity::{verifier_from_config, SharedVerifier};
use crate::storage::{open_store, SharedStore};

mod health;
mod routes;

/// Shared server state injected into all handlers.
///
/// Holds no mutable data of its own: the store behind `confessions` is the
/// only shared resource, and the verifier is read-only.
#[derive(Clone)]
pub struct AppState {
    pub confessions: ConfessionService,
    pub verifier: SharedVerifier,
    pub environment: Environment,
}

impl AppState {
    pub fn new(store: SharedStore, verifier: SharedVerifier, environment: Environment) -> Self {
        Self { confessions: ConfessionService::new(store), verifier, environment }
    }

    /// Turn an operation error into a response, logging internal failures.
    /// Only development responses carry the internal cause.
    pub fn fail(&self, err: AppError) -> Response {
        if err.is_internal() {
            error!(target: "confessions", "internal error: {err}");
        }
        err.into_http_response(self.environment.exposes_internal_errors())
    }
}

impl FromRef<AppState> for SharedVerifier {
    fn from_ref(state: &AppState) -> Self { state.verifier.clone() }
}

fn confession_routes(prefix: &str) -> Router<AppState> {
    Router::new()
        .route(prefix, get(routes::list_confessions).post(routes::create_confession))
        .route(
            &format!("{prefix}/{{id}}"),
            get(routes::get_confession).put(routes::update_confession).delete(routes::delete_confession),
        )
}

pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter(|o| {
            // credentialed CORS cannot use a wildcard origin
            if o.as_str() == "*" {
                warn!(target: "startup", "ignoring wildcard CORS origin");
            }
            o.as_str() != "*"
        })
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(target: "startup", "ignoring invalid CORS origin {o:?}: {e}");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

/// Full application router with middleware attached.
pub fn app(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(health::banner))
        .route("/health", get(health::health))
        .route("/api/health", get(health::api_health))
        .merge(confession_routes("/confessions"))
        .merge(confession_routes("/api/confessions"))
        .fallback(health::route_not_found)
        .method_not_allowed_fallback(health::route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn log_startup(config: &Config) {
    info!(
        target: "startup",
        "confessions starting: port={}, environment={}, data_dir={:?}, allowed_origins={:?}, jwt={}, dev_tokens={}",
        config.port,
        config.environment,
        config.data_dir,
        config.allowed_origins,
        config.auth_secret.is_some(),
        config.dev_tokens.len()
    );
}

/// Start the HTTP server with the given configuration and block until shutdown.
pub async fn run(config: Config) -> anyhow::Result<()> {
    log_startup(&config);

    let store = open_store(config.data_dir.as_deref()).await?;
    let verifier = verifier_from_config(&config);
    let state = AppState::new(store, verifier, config.environment);
    let app = app(state, &config.allowed_origins);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Binding to {addr}");
    let listener = TcpListener::bind(addr).await.with_context(|| format!("While binding {addr}"))?;
    info!("Server running on {addr}");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
