//! Student persistence: the `StudentStore` contract and its implementations.
//!
//! Handlers only see `Arc<dyn StudentStore>`; `SqliteStore` is the engine-backed
//! implementation and `MemoryStore` a process-local one for tests and local runs.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::StorageError;
use crate::model::{NewStudent, Student};
use async_trait::async_trait;

#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Persist a new student and return its assigned id.
    async fn create(&self, name: &str, email: &str, age: i64) -> Result<i64, StorageError>;

    /// Fetch one student. `StorageError::NotFound` when no record has `id`.
    async fn get_by_id(&self, id: i64) -> Result<Student, StorageError>;

    /// Every student, ascending by id. Empty when nothing is stored.
    async fn get_all(&self) -> Result<Vec<Student>, StorageError>;

    /// Overwrite name, email and age of an existing student; the id is kept.
    async fn update_by_id(&self, id: i64, patch: &NewStudent) -> Result<Student, StorageError>;

    /// Cheap liveness check used by `GET /ready`.
    async fn ping(&self) -> Result<(), StorageError>;
}
