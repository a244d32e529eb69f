//! In-memory `StudentStore`.

use super::StudentStore;
use crate::error::StorageError;
use crate::model::{NewStudent, Student};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Default)]
struct Inner {
    last_id: i64,
    rows: BTreeMap<i64, Student>,
}

/// Ids start at 1 and are never reused. The map is ordered so listing is by ascending id.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Unavailable("memory store lock poisoned".into())
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn create(&self, name: &str, email: &str, age: i64) -> Result<i64, StorageError> {
        let mut guard = self.inner.write().map_err(poisoned)?;
        guard.last_id += 1;
        let id = guard.last_id;
        guard.rows.insert(
            id,
            Student {
                id,
                name: name.to_string(),
                email: email.to_string(),
                age,
            },
        );
        Ok(id)
    }

    async fn get_by_id(&self, id: i64) -> Result<Student, StorageError> {
        let guard = self.inner.read().map_err(poisoned)?;
        guard.rows.get(&id).cloned().ok_or(StorageError::NotFound(id))
    }

    async fn get_all(&self) -> Result<Vec<Student>, StorageError> {
        let guard = self.inner.read().map_err(poisoned)?;
        Ok(guard.rows.values().cloned().collect())
    }

    async fn update_by_id(&self, id: i64, patch: &NewStudent) -> Result<Student, StorageError> {
        let mut guard = self.inner.write().map_err(poisoned)?;
        let row = guard.rows.get_mut(&id).ok_or(StorageError::NotFound(id))?;
        row.name = patch.name.clone();
        row.email = patch.email.clone();
        row.age = patch.age;
        Ok(row.clone())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.inner.read().map(|_| ()).map_err(poisoned)
    }
}
