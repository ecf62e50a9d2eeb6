use std::ops::RangeInclusive;

use super::error::DomainError;

const USERNAME_CHARS: RangeInclusive<usize> = 3..=64;
const PASSWORD_CHARS: RangeInclusive<usize> = 8..=128;

/// An account as posts and tokens see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
}

/// Username and password as submitted to register or log in.
#[derive(Debug, Clone)]
pub(crate) struct Credentials {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl Credentials {
    /// Usernames are trimmed and may not contain inner whitespace.
    /// Passwords are kept exactly as sent.
    pub(crate) fn for_signup(self) -> Result<Self, DomainError> {
        let username = self.username.trim();
        if !USERNAME_CHARS.contains(&username.chars().count()) {
            return Err(DomainError::Validation {
                field: "username",
                message: "must be 3..64 chars",
            });
        }
        if username.chars().any(char::is_whitespace) {
            return Err(DomainError::Validation {
                field: "username",
                message: "must not contain whitespace",
            });
        }
        if !PASSWORD_CHARS.contains(&self.password.chars().count()) {
            return Err(DomainError::Validation {
                field: "password",
                message: "must be 8..128 chars",
            });
        }

        Ok(Self {
            username: username.to_string(),
            password: self.password,
        })
    }

    /// Credentials that could never have been registered cannot match an
    /// account, so they fail the same way a wrong password does.
    pub(crate) fn for_login(self) -> Result<Self, DomainError> {
        self.for_signup()
            .map_err(|_| DomainError::InvalidCredentials)
    }
}
