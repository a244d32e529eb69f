//! Router assembly: student CRUD, common routes, envelope fallbacks, body limit and tracing.

pub mod common;
pub mod student;

pub use common::common_routes;
pub use student::{student_routes, STUDENTS_PATH, STUDENT_PATH};

use crate::handlers::student::route_not_found;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;

/// Full application router. Unknown paths get a 404 envelope and known paths
/// with an unsupported method a 405 envelope.
pub fn app_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(student_routes(state))
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
}
