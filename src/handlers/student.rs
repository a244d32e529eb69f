//! Student handlers: create, read, list, update.
//!
//! Each handler decodes and validates before touching storage, and every
//! failure path ends in an `AppError` envelope.

use crate::error::AppError;
use crate::model::{CreatedId, StudentInput};
use crate::response::{success_created, success_ok};
use crate::service::StudentValidator;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, rejection::PathRejection, Path, State},
    response::Response,
};
use serde_json::Value;

fn raw_id(path: Result<Path<String>, PathRejection>) -> Result<String, AppError> {
    let Path(raw) = path.map_err(|r| AppError::Malformed(r.body_text()))?;
    Ok(raw)
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::Malformed("invalid id format".into()))
}

/// Body must be a non-empty JSON object; field types are checked by serde, field values by the validator.
fn decode_body(body: Result<Bytes, BytesRejection>) -> Result<StudentInput, AppError> {
    let bytes = body.map_err(|r| AppError::Malformed(r.body_text()))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::Malformed("empty body".into()));
    }
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| AppError::Malformed(format!("invalid request body: {}", e)))?;
    if !value.is_object() {
        return Err(AppError::Malformed("body must be a JSON object".into()));
    }
    serde_json::from_value(value).map_err(|e| AppError::Malformed(format!("invalid request body: {}", e)))
}

/// POST /api/students
pub async fn create(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    tracing::info!("creating a student");
    let input = decode_body(body)?;
    let student = StudentValidator::validate(&input)?;
    let id = state.store.create(&student.name, &student.email, student.age).await?;
    tracing::info!(id, "student created");
    Ok(success_created(CreatedId { id }))
}

/// GET /api/students/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let raw = raw_id(path)?;
    tracing::info!(id = %raw, "getting a student");
    let id = parse_id(&raw)?;
    let student = state.store.get_by_id(id).await?;
    Ok(success_ok(student))
}

/// GET /api/students
pub async fn get_list(State(state): State<AppState>) -> Result<Response, AppError> {
    tracing::info!("getting all students");
    let students = state.store.get_all().await?;
    Ok(success_ok(students))
}

/// PUT|PATCH /api/students/:id — full replace of name, email and age.
pub async fn update_by_id(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let raw = raw_id(path)?;
    tracing::info!(id = %raw, "updating a student");
    let id = parse_id(&raw)?;
    let input = decode_body(body)?;
    let patch = StudentValidator::validate(&input)?;
    let student = state.store.update_by_id(id, &patch).await?;
    Ok(success_ok(student))
}

/// Fallback for a known path hit with an unsupported method.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Fallback for paths no route matches.
pub async fn route_not_found() -> AppError {
    AppError::NotFound("route not found".into())
}
