use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::data::user_repository::{StoredUser, UserRepository};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (username, password_hash) VALUES (?, ?) RETURNING id",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DomainError::AlreadyExists("username".to_string())
            }
            _ => DomainError::Storage(err.to_string()),
        })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<StoredUser>, DomainError> {
        sqlx::query_as::<_, StoredUser>(
            "SELECT id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| DomainError::Storage(err.to_string()))
    }
}
