//! Student registry: a small REST service for student records over a pluggable store.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod server;
pub mod service;
pub mod state;
pub mod storage;

pub use config::{Config, FileConfig};
pub use error::{AppError, ConfigError, StorageError};
pub use model::{NewStudent, Student, StudentInput};
pub use response::{error_fields, error_message, success_created, success_ok};
pub use routes::app_router;
pub use server::{serve, shutdown_signal};
pub use service::{StudentValidator, ValidationErrors};
pub use state::AppState;
pub use storage::{MemoryStore, SqliteStore, StudentStore};
