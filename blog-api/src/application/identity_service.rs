use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::{Credentials, User};
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::password::{PasswordError, PasswordVault};

/// A bearer token and the account it was issued for.
#[derive(Debug, Clone)]
pub(crate) struct Session {
    pub(crate) token: String,
    pub(crate) user: User,
}

pub(crate) struct IdentityService<R: UserRepository> {
    users: R,
    passwords: PasswordVault,
    tokens: Arc<JwtService>,
}

impl<R: UserRepository> IdentityService<R> {
    pub(crate) fn new(users: R, passwords: PasswordVault, tokens: Arc<JwtService>) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    pub(crate) async fn register(&self, credentials: Credentials) -> Result<Session, DomainError> {
        let credentials = credentials.for_signup()?;
        let password_hash = self.passwords.hash(&credentials.password).map_err(internal)?;

        let id = self
            .users
            .insert_user(&credentials.username, &password_hash)
            .await?;
        info!(user_id = id, "account registered");

        self.open_session(User {
            id,
            username: credentials.username,
        })
    }

    pub(crate) async fn login(&self, credentials: Credentials) -> Result<Session, DomainError> {
        let credentials = credentials.for_login()?;

        let Some(stored) = self.users.find_by_username(&credentials.username).await? else {
            self.passwords.burn_decoy(&credentials.password);
            debug!("login for unknown username");
            return Err(DomainError::InvalidCredentials);
        };

        let matches = self
            .passwords
            .verify(&credentials.password, &stored.password_hash)
            .map_err(internal)?;
        if !matches {
            warn!(user_id = stored.id, "login with wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        self.open_session(stored.into_user())
    }

    fn open_session(&self, user: User) -> Result<Session, DomainError> {
        let token = self
            .tokens
            .generate_token(user.id, &user.username)
            .map_err(|err| DomainError::Storage(err.to_string()))?;
        Ok(Session { token, user })
    }
}

fn internal(err: PasswordError) -> DomainError {
    DomainError::Storage(err.to_string())
}
