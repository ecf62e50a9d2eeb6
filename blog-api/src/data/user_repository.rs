use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::user::User;

/// Account row with its password hash. Stays inside the identity service.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct StoredUser {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) password_hash: String,
}

impl StoredUser {
    pub(crate) fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
        }
    }
}

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    /// Returns the new account id; a taken username is `AlreadyExists`.
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<i64, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredUser>, DomainError>;
}
