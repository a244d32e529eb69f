//! Request validation for student payloads.

use crate::model::{NewStudent, StudentInput};
use regex::Regex;
use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

pub const TAG_REQUIRED: &str = "required";
pub const TAG_EMAIL: &str = "email";
pub const TAG_POSITIVE: &str = "positive";

/// One failed constraint on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub tag: &'static str,
}

/// Non-empty, ordered list of violations. Serializes as `{ field: tag, ... }` in check order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tag_for(&self, field: &str) -> Option<&'static str> {
        self.0.iter().find(|v| v.field == field).map(|v| v.tag)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|v| format!("{} is {}", v.field, v.tag)).collect();
        f.write_str(&parts.join(", "))
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|v| (v.field, v.tag)))
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

pub struct StudentValidator;

impl StudentValidator {
    /// Check every field and collect all violations. Only a fully valid payload yields a `NewStudent`.
    pub fn validate(input: &StudentInput) -> Result<NewStudent, ValidationErrors> {
        let mut violations = Vec::new();

        let name = match input.name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => Some(n),
            _ => {
                violations.push(FieldViolation { field: "name", tag: TAG_REQUIRED });
                None
            }
        };

        let email = match input.email.as_deref().map(str::trim) {
            None | Some("") => {
                violations.push(FieldViolation { field: "email", tag: TAG_REQUIRED });
                None
            }
            Some(e) if !email_regex().is_match(e) => {
                violations.push(FieldViolation { field: "email", tag: TAG_EMAIL });
                None
            }
            Some(e) => Some(e),
        };

        let age = match input.age {
            None => {
                violations.push(FieldViolation { field: "age", tag: TAG_REQUIRED });
                None
            }
            Some(a) if a <= 0 => {
                violations.push(FieldViolation { field: "age", tag: TAG_POSITIVE });
                None
            }
            Some(a) => Some(a),
        };

        match (name, email, age) {
            (Some(name), Some(email), Some(age)) if violations.is_empty() => Ok(NewStudent {
                name: name.to_string(),
                email: email.to_string(),
                age,
            }),
            _ => Err(ValidationErrors(violations)),
        }
    }
}
