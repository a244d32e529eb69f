//! Common routes: health, readiness, version.

use crate::handlers::student::method_not_allowed;
use crate::response::{error_message, success_ok};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::Response, routing::get, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct VersionBody {
    name: &'static str,
    version: &'static str,
}

async fn health() -> Response {
    success_ok(HealthBody { status: "ok" })
}

async fn ready(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(()) => success_ok(HealthBody { status: "ok" }),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            error_message(StatusCode::SERVICE_UNAVAILABLE, "storage unavailable")
        }
    }
}

async fn version() -> Response {
    success_ok(VersionBody {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health, GET /ready (storage ping), GET /version.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health).fallback(method_not_allowed))
        .route("/ready", get(ready).fallback(method_not_allowed))
        .route("/version", get(version).fallback(method_not_allowed))
        .with_state(state)
}
