//! Student CRUD routes. `:id` is passed to handlers as a raw string.

use crate::handlers::student::{create, get_by_id, get_list, method_not_allowed, update_by_id};
use crate::state::AppState;
use axum::{routing::get, Router};

pub const STUDENTS_PATH: &str = "/api/students";
pub const STUDENT_PATH: &str = "/api/students/:id";

pub fn student_routes(state: AppState) -> Router {
    Router::new()
        .route(
            STUDENTS_PATH,
            get(get_list).post(create).fallback(method_not_allowed),
        )
        .route(
            STUDENT_PATH,
            get(get_by_id)
                .put(update_by_id)
                .patch(update_by_id)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}
