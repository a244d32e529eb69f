//! Typed errors and HTTP mapping.

use crate::response::{error_fields, error_message};
use crate::service::ValidationErrors;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("config load: {0}")]
    Load(String),
}

/// Failures raised by a `StudentStore` implementation.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("student {0} not found")]
    NotFound(i64),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Malformed(String),
    #[error("validation: {0}")]
    Validation(ValidationErrors),
    #[error("{0}")]
    NotFound(String),
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(id) => AppError::NotFound(format!("student {} not found", id)),
            other => AppError::Storage(other),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(e: ValidationErrors) -> Self {
        AppError::Validation(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Malformed(msg) => error_message(StatusCode::BAD_REQUEST, &msg),
            AppError::Validation(errors) => error_fields(StatusCode::BAD_REQUEST, &errors),
            AppError::NotFound(msg) => error_message(StatusCode::NOT_FOUND, &msg),
            AppError::MethodNotAllowed => error_message(StatusCode::METHOD_NOT_ALLOWED, "method not allowed"),
            AppError::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                error_message(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_not_found_is_not_a_storage_fault() {
        let app: AppError = StorageError::NotFound(7).into();
        assert!(matches!(app, AppError::NotFound(ref m) if m == "student 7 not found"));
    }

    #[test]
    fn storage_fault_maps_to_500() {
        let app: AppError = StorageError::Unavailable("lock poisoned".into()).into();
        assert_eq!(app.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::Malformed("empty body".into()).into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("x".into()).into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::MethodNotAllowed.into_response().status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
