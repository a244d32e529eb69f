//! Student entity and request payload types.

use serde::{Deserialize, Serialize};

/// A persisted student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i64,
}

/// Decoded request body for create and update. Fields are optional here so a
/// missing field is reported by the validator as `required`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
}

/// Fields of a student that passed validation. Used for both create and full replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub age: i64,
}

/// Body of a successful create.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CreatedId {
    pub id: i64,
}
