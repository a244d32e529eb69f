//! Standard response envelope helpers.
//!
//! Success: `{ "status": "OK", "data": ... }`.
//! Error: `{ "status": "Error", "error": "..." }` or `{ "status": "Error", "errors": { field: tag } }`.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

const STATUS_OK: &str = "OK";
const STATUS_ERROR: &str = "Error";

/// Written verbatim when an envelope cannot be serialized.
const FALLBACK_BODY: &str = r#"{"status":"Error","error":"internal server error"}"#;

#[derive(Serialize)]
pub struct Success<T> {
    pub status: &'static str,
    pub data: T,
}

#[derive(Serialize)]
pub struct ErrorBody<'a> {
    pub status: &'static str,
    pub error: &'a str,
}

#[derive(Serialize)]
pub struct FieldErrorBody<'a, E> {
    pub status: &'static str,
    pub errors: &'a E,
}

/// Serialize `body` as the JSON response. A serialization failure is logged and
/// answered with a fixed 500 envelope.
pub fn write_json<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response envelope");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                FALLBACK_BODY,
            )
                .into_response()
        }
    }
}

pub fn success<T: Serialize>(status: StatusCode, data: T) -> Response {
    write_json(status, &Success { status: STATUS_OK, data })
}

pub fn success_created<T: Serialize>(data: T) -> Response {
    success(StatusCode::CREATED, data)
}

pub fn success_ok<T: Serialize>(data: T) -> Response {
    success(StatusCode::OK, data)
}

pub fn error_message(status: StatusCode, message: &str) -> Response {
    write_json(status, &ErrorBody { status: STATUS_ERROR, error: message })
}

pub fn error_fields<E: Serialize>(status: StatusCode, errors: &E) -> Response {
    write_json(status, &FieldErrorBody { status: STATUS_ERROR, errors })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(<S::Error as serde::ser::Error>::custom("refusing to serialize"))
        }
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn success_envelope_shape() {
        let resp = success_created(serde_json::json!({ "id": 1 }));
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(body_json(resp).await, serde_json::json!({ "status": "OK", "data": { "id": 1 } }));
    }

    #[tokio::test]
    async fn error_envelope_shape() {
        let resp = error_message(StatusCode::NOT_FOUND, "student 3 not found");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!({ "status": "Error", "error": "student 3 not found" })
        );
    }

    #[tokio::test]
    async fn serialization_failure_becomes_500() {
        let resp = success_ok(Unserializable);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!({ "status": "Error", "error": "internal server error" })
        );
    }
}
