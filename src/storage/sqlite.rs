//! SQLite-backed `StudentStore` using sqlx.

use super::StudentStore;
use crate::error::StorageError;
use crate::model::{NewStudent, Student};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const STUDENTS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS students (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        age INTEGER NOT NULL
    )
"#;

type StudentRow = (i64, String, String, i64);

fn into_student((id, name, email, age): StudentRow) -> Student {
    Student { id, name, email, age }
}

/// Every operation is a single statement, so a dropped request future never
/// leaves a half-applied write behind.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database file at `path` and ensure the schema exists.
    /// `timeout` bounds both pool acquisition and SQLite's busy wait.
    pub async fn open(path: &Path, timeout: Duration) -> Result<Self, StorageError> {
        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(timeout);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(timeout)
            .connect_with(opts)
            .await?;
        Self::from_pool(pool).await
    }

    /// Private in-memory database. One connection that never idles out, since
    /// each SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        sqlx::query(STUDENTS_DDL).execute(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl StudentStore for SqliteStore {
    async fn create(&self, name: &str, email: &str, age: i64) -> Result<i64, StorageError> {
        let result = sqlx::query("INSERT INTO students (name, email, age) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(age)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn get_by_id(&self, id: i64) -> Result<Student, StorageError> {
        let row: Option<StudentRow> =
            sqlx::query_as("SELECT id, name, email, age FROM students WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(into_student).ok_or(StorageError::NotFound(id))
    }

    async fn get_all(&self) -> Result<Vec<Student>, StorageError> {
        let rows: Vec<StudentRow> =
            sqlx::query_as("SELECT id, name, email, age FROM students ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(into_student).collect())
    }

    async fn update_by_id(&self, id: i64, patch: &NewStudent) -> Result<Student, StorageError> {
        let row: Option<StudentRow> = sqlx::query_as(
            "UPDATE students SET name = ?, email = ?, age = ? WHERE id = ? RETURNING id, name, email, age",
        )
        .bind(&patch.name)
        .bind(&patch.email)
        .bind(patch.age)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(into_student).ok_or(StorageError::NotFound(id))
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}
