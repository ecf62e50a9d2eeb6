use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Not authorized to {action} this post")]
    Forbidden { action: &'static str },

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("storage error: {0}")]
    Storage(String),
}
