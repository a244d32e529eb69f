//! Request validation for inbound payloads.

mod validation;
pub use validation::{FieldViolation, StudentValidator, ValidationErrors, TAG_EMAIL, TAG_POSITIVE, TAG_REQUIRED};
